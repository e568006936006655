// src/core/converter.rs
use std::borrow::Cow;

/// Arabic-Indic digit zero, U+0660. The ten digits are contiguous.
const ARABIC_INDIC_ZERO: char = '\u{0660}';

/// The fixed table from Arabic-Indic digits (٠-٩) to Western Arabic digits (0-9).
///
/// There is exactly one table for the process; use [`DigitMap::global`].
#[derive(Debug)]
pub struct DigitMap {
    entries: [(char, char); 10],
}

static DIGIT_MAP: DigitMap = DigitMap::new();

impl DigitMap {
    const fn new() -> Self {
        Self {
            entries: [
                ('٠', '0'), ('١', '1'), ('٢', '2'), ('٣', '3'), ('٤', '4'),
                ('٥', '5'), ('٦', '6'), ('٧', '7'), ('٨', '8'), ('٩', '9'),
            ],
        }
    }

    pub fn global() -> &'static DigitMap {
        &DIGIT_MAP
    }

    /// Looks up a single character. O(1): the digits occupy one code point block.
    pub fn get(&self, c: char) -> Option<char> {
        let offset = (c as u32).checked_sub(ARABIC_INDIC_ZERO as u32)?;
        self.entries.get(offset as usize).map(|&(_, western)| western)
    }

    pub fn contains(&self, c: char) -> bool {
        self.get(c).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.entries.iter().copied()
    }
}

/// Replaces every Arabic-Indic digit with its Western counterpart.
///
/// The result has the same number of characters as the input, so caret
/// offsets measured in characters stay valid. Borrows when there is nothing
/// to replace.
pub fn convert(text: &str) -> Cow<'_, str> {
    let map = DigitMap::global();
    let Some(first) = text.find(|c| map.contains(c)) else {
        return Cow::Borrowed(text);
    };

    let mut result = String::with_capacity(text.len());
    result.push_str(&text[..first]);
    for c in text[first..].chars() {
        result.push(map.get(c).unwrap_or(c));
    }
    Cow::Owned(result)
}

/// `convert` for content that may be absent. `None` stays `None`.
pub fn convert_optional(text: Option<&str>) -> Option<Cow<'_, str>> {
    text.map(convert)
}
