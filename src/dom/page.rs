// src/dom/page.rs
//! A single-threaded page: a document plus the event loop around it.
//!
//! Every top-level call on `Page` is one task. Mutation records queued while a
//! task runs are delivered to observers once the outermost task returns,
//! which is when a browser runs its microtask checkpoint.

use crate::core::types::{EventKind, NodeId, ReadyState};
use crate::dom::document::Document;
use crate::error::{NumeralError, Result};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    /// `None` while the event is at the document itself.
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub type Listener = Rc<dyn Fn(&mut Page, &Event)>;
pub type TimerTask = Box<dyn FnOnce(&mut Page)>;
pub type MutationCallback = Rc<dyn Fn(&mut Page, &[MutationRecord])>;

struct Observer {
    id: ObserverId,
    root: NodeId,
    subtree: bool,
    callback: MutationCallback,
    pending: Vec<MutationRecord>,
}

pub struct Page {
    document: Document,
    listeners: HashMap<NodeId, Vec<(EventKind, Listener)>>,
    document_listeners: Vec<(EventKind, Listener)>,
    timers: BTreeMap<(Duration, TimerId), TimerTask>,
    now: Duration,
    next_timer: u64,
    observers: Vec<Observer>,
    next_observer: u64,
    task_depth: usize,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: HashMap::new(),
            document_listeners: Vec::new(),
            timers: BTreeMap::new(),
            now: Duration::ZERO,
            next_timer: 0,
            observers: Vec::new(),
            next_observer: 0,
            task_depth: 0,
        }
    }

    /// A page whose document is still parsing; see [`Page::finish_loading`].
    pub fn loading(mut document: Document) -> Self {
        document.set_ready_state(ReadyState::Loading);
        Self::new(document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct document access. Tree changes made through here are not seen
    /// by observers; use [`Page::append_child`] for those.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    fn run_task<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.task_depth += 1;
        let result = f(self);
        self.task_depth -= 1;
        if self.task_depth == 0 {
            self.deliver_mutations();
        }
        result
    }

    // ---- listeners and dispatch ----

    pub fn add_event_listener(&mut self, target: NodeId, kind: EventKind, listener: Listener) {
        self.listeners.entry(target).or_default().push((kind, listener));
    }

    pub fn add_document_listener(&mut self, kind: EventKind, listener: Listener) {
        self.document_listeners.push((kind, listener));
    }

    pub fn listener_count(&self, target: NodeId, kind: EventKind) -> usize {
        self.listeners
            .get(&target)
            .map(|ls| ls.iter().filter(|(k, _)| *k == kind).count())
            .unwrap_or(0)
    }

    /// Dispatches at `target`, then up through its ancestors and finally the
    /// document when `bubbles` is set. Returns the number of listeners run.
    pub fn dispatch_event(&mut self, target: NodeId, kind: EventKind, bubbles: bool) -> usize {
        self.run_task(|page| {
            let path = if bubbles {
                page.document.ancestors_inclusive(target)
            } else {
                vec![target]
            };

            let mut invoked = 0;
            for node in path {
                let matching: Vec<Listener> = page
                    .listeners
                    .get(&node)
                    .map(|ls| {
                        ls.iter()
                            .filter(|(k, _)| *k == kind)
                            .map(|(_, l)| Rc::clone(l))
                            .collect()
                    })
                    .unwrap_or_default();
                let event = Event {
                    kind,
                    target,
                    current_target: Some(node),
                    bubbles,
                };
                for listener in matching {
                    listener(page, &event);
                    invoked += 1;
                }
            }

            if bubbles && page.document.is_connected(target) {
                invoked += page.dispatch_to_document(kind, target);
            }
            invoked
        })
    }

    fn dispatch_to_document(&mut self, kind: EventKind, target: NodeId) -> usize {
        let matching: Vec<Listener> = self
            .document_listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| Rc::clone(l))
            .collect();
        let event = Event {
            kind,
            target,
            current_target: None,
            bubbles: true,
        };
        for listener in &matching {
            listener(self, &event);
        }
        matching.len()
    }

    /// Marks the document loaded and fires `DOMContentLoaded` once.
    pub fn finish_loading(&mut self) {
        if self.document.ready_state() == ReadyState::Complete {
            return;
        }
        self.document.set_ready_state(ReadyState::Complete);
        let root = self.document.root();
        self.run_task(|page| {
            page.dispatch_to_document(EventKind::DomContentLoaded, root);
        });
    }

    // ---- timers ----

    pub fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert((self.now + delay, id), task);
        id
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Advances the virtual clock, running due timers in deadline order.
    /// Timers scheduled by a running timer fire in the same call if due.
    pub fn advance(&mut self, by: Duration) {
        let until = self.now + by;
        loop {
            let due = match self.timers.keys().next() {
                Some(&key) if key.0 <= until => key,
                _ => break,
            };
            let Some(task) = self.timers.remove(&due) else {
                break;
            };
            self.now = due.0;
            self.run_task(|page| task(page));
        }
        self.now = until;
    }

    // ---- mutation observers ----

    /// Watches child-list changes of `root` (and its descendants when
    /// `subtree` is set).
    pub fn observe(&mut self, root: NodeId, subtree: bool, callback: MutationCallback) -> Result<ObserverId> {
        if self.document.node(root).is_none() {
            return Err(NumeralError::UnknownNode(root));
        }
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer {
            id,
            root,
            subtree,
            callback,
            pending: Vec::new(),
        });
        Ok(id)
    }

    /// Stops an observer, dropping records it has not received yet.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.run_task(|page| {
            page.document.append_child(parent, child)?;
            let record = MutationRecord {
                target: parent,
                added_nodes: vec![child],
            };
            for i in 0..page.observers.len() {
                let observer = &page.observers[i];
                let interested = observer.root == parent
                    || (observer.subtree && page.document.is_inclusive_ancestor(observer.root, parent));
                if interested {
                    page.observers[i].pending.push(record.clone());
                }
            }
            Ok(())
        })
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.document.remove_child(parent, child)
    }

    fn deliver_mutations(&mut self) {
        self.task_depth += 1;
        loop {
            let Some(index) = self.observers.iter().position(|o| !o.pending.is_empty()) else {
                break;
            };
            let records = std::mem::take(&mut self.observers[index].pending);
            let callback = Rc::clone(&self.observers[index].callback);
            callback(self, &records);
        }
        self.task_depth -= 1;
    }

    // ---- user actions ----

    /// Types `text` one character at a time at the caret. Each keystroke
    /// fires `input` followed by `keyup`.
    pub fn type_text(&mut self, field: NodeId, text: &str) -> Result<()> {
        for c in text.chars() {
            let mut buf = [0u8; 4];
            self.document
                .element_mut(field)
                .ok_or(NumeralError::UnknownNode(field))?
                .insert_at_caret(c.encode_utf8(&mut buf));
            self.dispatch_event(field, EventKind::Input, true);
            self.dispatch_event(field, EventKind::KeyUp, true);
        }
        Ok(())
    }

    /// Fires `paste`, then inserts the clipboard text at the caret. No
    /// `input` event follows, so only paste handling sees the new text.
    pub fn paste_text(&mut self, field: NodeId, text: &str) -> Result<()> {
        if self.document.element(field).is_none() {
            return Err(NumeralError::UnknownNode(field));
        }
        self.dispatch_event(field, EventKind::Paste, true);
        if let Some(el) = self.document.element_mut(field) {
            el.insert_at_caret(text);
        }
        Ok(())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Document::new())
    }
}
