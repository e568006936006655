// src/core/types.rs
use std::fmt;

/// Index of a node in a `Document` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input types a browser recognizes. Anything else reflects as `text`.
const KNOWN_INPUT_TYPES: &[&str] = &[
    "button",
    "checkbox",
    "color",
    "date",
    "datetime-local",
    "email",
    "file",
    "hidden",
    "image",
    "month",
    "number",
    "password",
    "radio",
    "range",
    "reset",
    "search",
    "submit",
    "tel",
    "text",
    "time",
    "url",
    "week",
];

/// The `type` attribute of an `<input>`, as far as field targeting cares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputType {
    Text,
    Number,
    Tel,
    Other(String),
}

impl InputType {
    /// Parses an attribute value the way the DOM reflects it: a missing or
    /// unrecognized attribute means `text`.
    pub fn from_attr(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return InputType::Text;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "text" => InputType::Text,
            "number" => InputType::Number,
            "tel" => InputType::Tel,
            other if KNOWN_INPUT_TYPES.contains(&other) => InputType::Other(other.to_string()),
            _ => InputType::Text,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InputType::Text => "text",
            InputType::Number => "number",
            InputType::Tel => "tel",
            InputType::Other(s) => s,
        }
    }
}

/// Events the normalizer consumes or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    KeyUp,
    Paste,
    Change,
    DomContentLoaded,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::KeyUp => "keyup",
            EventKind::Paste => "paste",
            EventKind::Change => "change",
            EventKind::DomContentLoaded => "DOMContentLoaded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Complete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_type_is_text() {
        assert_eq!(InputType::from_attr(None), InputType::Text);
        assert_eq!(InputType::from_attr(Some("")), InputType::Text);
    }

    #[test]
    fn type_is_case_insensitive() {
        assert_eq!(InputType::from_attr(Some("NUMBER")), InputType::Number);
        assert_eq!(InputType::from_attr(Some(" Tel ")), InputType::Tel);
        assert_eq!(
            InputType::from_attr(Some("email")),
            InputType::Other("email".to_string())
        );
    }

    #[test]
    fn unrecognized_type_is_text() {
        assert_eq!(InputType::from_attr(Some("bogus")), InputType::Text);
        assert_eq!(InputType::from_attr(Some("digits")), InputType::Text);
        assert_eq!(
            InputType::from_attr(Some("Checkbox")),
            InputType::Other("checkbox".to_string())
        );
    }
}
