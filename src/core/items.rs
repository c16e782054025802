//! Item name normalization.
//!
//! Game logs name items by internal identifiers (`cow_female`, `cornSeed`); the
//! dashboard wants display names (`Vaca`, `Corn Seed`). Lookup is exact match,
//! then substring match in table order, then a deterministic formatting fallback.

use crate::config::parser::ItemAlias;

/// Label used when there is no item name at all.
pub const DEFAULT_ITEM_LABEL: &str = "Item";

/// Maps raw item identifiers to display names.
#[derive(Debug, Clone)]
pub struct ItemNormalizer {
    // (lowercased key, display name), in configuration order
    entries: Vec<(String, String)>,
}

impl ItemNormalizer {
    /// Builds a normalizer from the ordered alias table. Blank keys are skipped,
    /// they would otherwise match every name as a substring.
    #[must_use]
    pub fn new(items: &[ItemAlias]) -> Self {
        let entries = items
            .iter()
            .filter(|alias| !alias.key.trim().is_empty())
            .map(|alias| (alias.key.trim().to_lowercase(), alias.name.clone()))
            .collect();
        Self { entries }
    }

    /// Returns the display name for `raw`. Never empty.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return DEFAULT_ITEM_LABEL.to_string();
        }

        let lowered = trimmed.to_lowercase();

        if let Some((_, name)) = self.entries.iter().find(|(key, _)| *key == lowered) {
            return name.clone();
        }

        if let Some((_, name)) = self
            .entries
            .iter()
            .find(|(key, _)| lowered.contains(key.as_str()))
        {
            return name.clone();
        }

        let formatted = format_identifier(trimmed);
        if formatted.is_empty() {
            trimmed.to_string()
        } else {
            formatted
        }
    }
}

/// `cow_female` → `Cow Female`, `cornSeed` → `Corn Seed`.
#[must_use]
pub fn format_identifier(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.chars() {
        if ch == '_' {
            spaced.push(' ');
            prev_lower = false;
            continue;
        }
        if prev_lower && ch.is_uppercase() {
            spaced.push(' ');
        }
        prev_lower = ch.is_lowercase();
        spaced.push(ch);
    }

    spaced
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}
