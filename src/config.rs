// src/config.rs
use crate::core::selector::{SelectorPreset, SelectorSet};
use crate::error::{NumeralError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "numeral_config.json";
pub const DEFAULT_PASTE_DELAY_MS: u64 = 10;
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-arabic-converter-initialized";

/// Which fields to normalize and how. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub preset: SelectorPreset,
    /// Explicit selector patterns. When non-empty they replace the preset.
    pub selectors: Vec<String>,
    /// How long to wait after a `paste` event before normalizing.
    pub paste_delay_ms: u64,
    /// Attribute that marks a field as already attached.
    pub marker_attribute: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            preset: SelectorPreset::Generic,
            selectors: Vec::new(),
            paste_delay_ms: DEFAULT_PASTE_DELAY_MS,
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
        }
    }
}

impl NormalizerConfig {
    pub fn selector_set(&self) -> Result<SelectorSet> {
        if self.selectors.is_empty() {
            Ok(SelectorSet::from_preset(self.preset))
        } else {
            SelectorSet::parse(&self.selectors)
        }
    }

    pub fn paste_delay(&self) -> Duration {
        Duration::from_millis(self.paste_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let marker = &self.marker_attribute;
        let valid_marker = !marker.is_empty()
            && marker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_marker {
            return Err(NumeralError::InvalidConfig(format!(
                "marker attribute `{marker}` is not a valid attribute name"
            )));
        }
        self.selector_set().map(|_| ())
    }
}
