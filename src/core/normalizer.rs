// src/core/normalizer.rs
use crate::config::NormalizerConfig;
use crate::core::converter::convert;
use crate::core::selector::SelectorSet;
use crate::core::types::{EventKind, NodeId};
use crate::dom::{Document, Event, Page};
use crate::error::Result;
use std::borrow::Cow;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

struct Inner {
    selectors: SelectorSet,
    paste_delay: Duration,
    marker_attribute: String,
    passes: Cell<u64>,
    rewrites: Cell<u64>,
}

/// Rewrites Arabic-Indic digits in attached fields as the user edits them.
///
/// Cloning is cheap and clones share counters; listeners registered by
/// [`DigitNormalizer::attach`] hold a clone.
#[derive(Clone)]
pub struct DigitNormalizer {
    inner: Rc<Inner>,
}

impl DigitNormalizer {
    pub fn new(selectors: SelectorSet, paste_delay: Duration, marker_attribute: &str) -> Self {
        Self {
            inner: Rc::new(Inner {
                selectors,
                paste_delay,
                marker_attribute: marker_attribute.to_string(),
                passes: Cell::new(0),
                rewrites: Cell::new(0),
            }),
        }
    }

    pub fn from_config(config: &NormalizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.selector_set()?,
            config.paste_delay(),
            &config.marker_attribute,
        ))
    }

    pub fn selectors(&self) -> &SelectorSet {
        &self.inner.selectors
    }

    /// Number of times field content was examined.
    pub fn passes(&self) -> u64 {
        self.inner.passes.get()
    }

    /// Number of times field content was actually rewritten.
    pub fn rewrites(&self) -> u64 {
        self.inner.rewrites.get()
    }

    pub fn is_target(&self, document: &Document, node: NodeId) -> bool {
        document
            .element(node)
            .is_some_and(|el| self.inner.selectors.matches(el))
    }

    pub fn is_attached(&self, document: &Document, node: NodeId) -> bool {
        document
            .element(node)
            .is_some_and(|el| el.has_attr(&self.inner.marker_attribute))
    }

    /// Registers the normalizing listeners on `field` unless it carries the
    /// marker already. Returns `true` when listeners were added.
    pub fn attach(&self, page: &mut Page, field: NodeId) -> bool {
        if page.document().element(field).is_none() || self.is_attached(page.document(), field) {
            return false;
        }

        for kind in [EventKind::Input, EventKind::KeyUp] {
            let normalizer = self.clone();
            page.add_event_listener(
                field,
                kind,
                Rc::new(move |page: &mut Page, _: &Event| {
                    normalizer.on_field_change(page, field);
                }),
            );
        }

        let normalizer = self.clone();
        page.add_event_listener(
            field,
            EventKind::Paste,
            Rc::new(move |page: &mut Page, _: &Event| {
                let normalizer = normalizer.clone();
                let delay = normalizer.inner.paste_delay;
                page.set_timeout(
                    delay,
                    Box::new(move |page: &mut Page| {
                        normalizer.on_field_change(page, field);
                    }),
                );
            }),
        );

        if let Some(el) = page.document_mut().element_mut(field) {
            el.set_attr(&self.inner.marker_attribute, "true");
        }
        tracing::trace!(%field, "attached digit normalizer");
        true
    }

    /// Normalizes the field's current value. When anything changed the value
    /// is replaced, the caret is put back where it was and a bubbling
    /// `change` event is fired. Returns whether the value changed.
    pub fn on_field_change(&self, page: &mut Page, field: NodeId) -> bool {
        self.inner.passes.set(self.inner.passes.get() + 1);

        let Some(el) = page.document().element(field) else {
            return false;
        };
        let original = el.value();
        if original.is_empty() {
            return false;
        }
        let converted = match convert(original) {
            Cow::Borrowed(_) => return false,
            Cow::Owned(s) => s,
        };
        let caret = el.selection_start();

        if let Some(el) = page.document_mut().element_mut(field) {
            el.set_value(&converted);
            el.set_selection_range(caret, caret);
        }
        self.inner.rewrites.set(self.inner.rewrites.get() + 1);
        tracing::debug!(%field, value = %converted, caret, "normalized field digits");

        page.dispatch_event(field, EventKind::Change, true);
        true
    }

    /// Attaches `root` if it is a target, then every target below it.
    /// Returns how many fields were newly attached.
    pub fn scan_and_attach(&self, page: &mut Page, root: NodeId) -> usize {
        // Text nodes have nothing to scan.
        if page.document().element(root).is_none() {
            return 0;
        }

        let mut candidates = vec![root];
        candidates.extend(page.document().descendants(root));

        let mut attached = 0;
        for node in candidates {
            if self.is_target(page.document(), node) && self.attach(page, node) {
                attached += 1;
            }
        }
        attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selector::SelectorPreset;

    fn normalizer() -> DigitNormalizer {
        DigitNormalizer::from_config(&NormalizerConfig::default()).unwrap()
    }

    fn page_with_input(input_type: &str) -> (Page, NodeId) {
        let mut page = Page::default();
        let body = page.document().body().unwrap();
        let input = page.document_mut().create_element("input");
        page.document_mut().set_attribute(input, "type", input_type).unwrap();
        page.append_child(body, input).unwrap();
        (page, input)
    }

    #[test]
    fn attach_sets_marker_and_three_listeners() {
        let (mut page, input) = page_with_input("tel");
        let n = normalizer();
        assert!(n.attach(&mut page, input));
        assert!(n.is_attached(page.document(), input));
        for kind in [EventKind::Input, EventKind::KeyUp, EventKind::Paste] {
            assert_eq!(page.listener_count(input, kind), 1);
        }
        assert!(!n.attach(&mut page, input));
        assert_eq!(page.listener_count(input, EventKind::Input), 1);
    }

    #[test]
    fn attach_ignores_text_nodes() {
        let mut page = Page::default();
        let text = page.document_mut().create_text("١٢");
        assert!(!normalizer().attach(&mut page, text));
    }

    #[test]
    fn unchanged_or_empty_value_is_a_no_op() {
        let (mut page, input) = page_with_input("text");
        let n = normalizer();
        assert!(!n.on_field_change(&mut page, input));
        page.document_mut().set_value(input, "abc 123").unwrap();
        assert!(!n.on_field_change(&mut page, input));
        assert_eq!(n.passes(), 2);
        assert_eq!(n.rewrites(), 0);
    }

    #[test]
    fn caret_in_middle_is_preserved() {
        let (mut page, input) = page_with_input("text");
        page.document_mut().set_value(input, "٠٥٥١٢٣").unwrap();
        page.document_mut().set_selection_range(input, 3, 3).unwrap();
        assert!(normalizer().on_field_change(&mut page, input));
        assert_eq!(page.document().value(input), Some("055123"));
        assert_eq!(page.document().selection_start(input), Some(3));
    }

    #[test]
    fn scan_skips_non_targets() {
        let mut page = Page::default();
        let body = page.document().body().unwrap();
        let email = page.document_mut().create_element("input");
        page.document_mut().set_attribute(email, "type", "email").unwrap();
        let untyped = page.document_mut().create_element("input");
        page.append_child(body, email).unwrap();
        page.append_child(body, untyped).unwrap();

        let n = normalizer();
        assert_eq!(n.scan_and_attach(&mut page, body), 1);
        assert!(!n.is_attached(page.document(), email));
        assert!(n.is_attached(page.document(), untyped));
        assert_eq!(n.scan_and_attach(&mut page, body), 0);
    }

    #[test]
    fn custom_marker_attribute_is_used() {
        let (mut page, input) = page_with_input("number");
        let n = DigitNormalizer::new(
            SelectorSet::from_preset(SelectorPreset::Generic),
            Duration::from_millis(5),
            "data-digits-ready",
        );
        n.attach(&mut page, input);
        let el = page.document().element(input).unwrap();
        assert_eq!(el.attr("data-digits-ready"), Some("true"));
    }
}
