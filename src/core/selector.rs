// src/core/selector.rs
//! CSS-like selector patterns that decide which fields get normalized.
//!
//! Only the subset field targeting needs is understood: an optional tag name
//! followed by attribute conditions `[attr]`, `[attr=value]` and
//! `[attr*=value]`, with selector lists separated by commas.

use crate::core::types::InputType;
use crate::dom::Element;
use crate::error::{NumeralError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The generic selector set: every numeric, telephone and text input.
pub const GENERIC_SELECTORS: &[&str] = &[
    r#"input[type="number"]"#,
    r#"input[type="tel"]"#,
    r#"input[type="text"]"#,
];

/// The variant build: numeric and telephone inputs plus text inputs whose
/// name hints at a number.
pub const NAME_HEURISTIC_SELECTORS: &[&str] = &[
    r#"input[type="number"]"#,
    r#"input[type="tel"]"#,
    r#"input[type="text"][name*="phone"]"#,
    r#"input[type="text"][name*="quantity"]"#,
    r#"input[type="text"][name*="price"]"#,
    r#"input[type="text"][name*="paid"]"#,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorPreset {
    #[default]
    Generic,
    NameHeuristic,
}

impl SelectorPreset {
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            SelectorPreset::Generic => GENERIC_SELECTORS,
            SelectorPreset::NameHeuristic => NAME_HEURISTIC_SELECTORS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    op: AttrOp,
}

impl AttrCondition {
    fn matches(&self, element: &Element) -> bool {
        if self.name == "type" {
            // The DOM reflects a missing or unknown `type` as "text".
            let raw = element.attr("type");
            let reflected = InputType::from_attr(raw);
            return match &self.op {
                AttrOp::Exists => raw.is_some(),
                AttrOp::Equals(v) => reflected.as_str().eq_ignore_ascii_case(v),
                AttrOp::Contains(v) => {
                    !v.is_empty() && reflected.as_str().contains(&v.to_ascii_lowercase())
                }
            };
        }

        let Some(value) = element.attr(&self.name) else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            // `[attr*=""]` never matches in CSS.
            AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
        }
    }
}

/// One compound selector such as `input[type="tel"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPattern {
    source: String,
    tag: Option<String>,
    conditions: Vec<AttrCondition>,
}

impl SelectorPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let source = pattern.trim();
        let invalid = |reason: &str| NumeralError::InvalidSelector {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if source.is_empty() {
            return Err(invalid("empty selector"));
        }

        let mut chars = source.chars().peekable();

        let mut tag = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '*' {
                tag.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if tag.contains('*') && tag != "*" {
            return Err(invalid("malformed tag name"));
        }
        let tag = match tag.as_str() {
            "" | "*" => None,
            t => Some(t.to_ascii_lowercase()),
        };

        let mut conditions = Vec::new();
        while let Some(c) = chars.next() {
            if c != '[' {
                return Err(invalid(&format!("unexpected character `{c}`")));
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                return Err(invalid("missing attribute name"));
            }
            let name = name.to_ascii_lowercase();

            let op = match chars.next() {
                Some(']') => {
                    conditions.push(AttrCondition { name, op: AttrOp::Exists });
                    continue;
                }
                Some('=') => AttrOp::Equals(parse_value(&mut chars).map_err(|r| invalid(r))?),
                Some('*') => {
                    if chars.next() != Some('=') {
                        return Err(invalid("expected `*=`"));
                    }
                    AttrOp::Contains(parse_value(&mut chars).map_err(|r| invalid(r))?)
                }
                Some(c) => return Err(invalid(&format!("unsupported operator at `{c}`"))),
                None => return Err(invalid("unterminated attribute condition")),
            };

            if chars.next() != Some(']') {
                return Err(invalid("expected `]`"));
            }
            conditions.push(AttrCondition { name, op });
        }

        Ok(Self {
            source: source.to_string(),
            tag,
            conditions,
        })
    }

    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if element.tag_name() != tag {
                return false;
            }
        }
        self.conditions.iter().all(|c| c.matches(element))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn parse_value(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> std::result::Result<String, &'static str> {
    let mut value = String::new();
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            loop {
                match chars.next() {
                    Some(c) if c == quote => break,
                    Some(c) => value.push(c),
                    None => return Err("unterminated quoted value"),
                }
            }
        }
        _ => {
            while let Some(&c) = chars.peek() {
                if c == ']' {
                    break;
                }
                if c.is_whitespace() || c == '"' || c == '\'' {
                    return Err("bare value must not contain quotes or spaces");
                }
                value.push(c);
                chars.next();
            }
            if value.is_empty() {
                return Err("missing attribute value");
            }
        }
    }
    Ok(value)
}

impl fmt::Display for SelectorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A selector list: an element is a target when any pattern matches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    patterns: Vec<SelectorPattern>,
}

impl SelectorSet {
    pub fn from_preset(preset: SelectorPreset) -> Self {
        let patterns = preset
            .patterns()
            .iter()
            .filter_map(|p| SelectorPattern::parse(p).ok())
            .collect();
        Self { patterns }
    }

    /// Builds a set from patterns, each of which may itself be a
    /// comma-separated list.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut parsed = Vec::new();
        for list in patterns {
            for pattern in split_selector_list(list.as_ref()) {
                parsed.push(SelectorPattern::parse(pattern)?);
            }
        }
        if parsed.is_empty() {
            return Err(NumeralError::InvalidSelector {
                pattern: String::new(),
                reason: "selector set is empty".to_string(),
            });
        }
        Ok(Self { patterns: parsed })
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.patterns.iter().any(|p| p.matches(element))
    }

    pub fn patterns(&self) -> &[SelectorPattern] {
        &self.patterns
    }
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self::from_preset(SelectorPreset::Generic)
    }
}

impl fmt::Display for SelectorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.patterns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.as_str())?;
        }
        Ok(())
    }
}

/// Splits on commas that are not inside quotes.
fn split_selector_list(list: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ',') => {
                out.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&list[start..]);
    out
}
