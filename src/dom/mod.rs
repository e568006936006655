// src/dom/mod.rs
//! In-process model of the parts of a web page that field normalization
//! touches: element and text nodes, field values with a caret, event
//! listeners, timers and child-list mutation observers.

pub mod document;
pub mod page;

pub use document::{Document, Element, Node, NodeKind};
pub use page::{Event, Listener, MutationCallback, MutationRecord, ObserverId, Page, TimerId};
