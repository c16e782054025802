//! Content fingerprints for duplicate detection.
//!
//! The chat bridge re-delivers the same log entry under new message ids, so the
//! key is built only from what the text says: author, logged timestamp,
//! quantity, item, amount and animal count, joined as
//! `author|timestamp|quantity|item|amount|animals`. Missing parts are empty
//! strings so positions stay stable.
//!
//! A line with none of the five content signals (chatter, unknown log shapes)
//! would otherwise reduce to `author|||||`, so its key gets a seventh part: the
//! SHA-256 of the markup-free text. Re-deliveries still collapse while distinct
//! lines from the same poster stay distinct.
//!
//! Two different events that agree on all six parts collide and the second is
//! treated as a repeat. That false positive is accepted: the game logs carry a
//! timestamp to the second, so a collision needs the same player moving the
//! same quantity of the same item twice within one second.

use crate::core::text::strip_inline_markup;
use crate::models::RawMessage;
use regex::Regex;
use sha2::{Digest, Sha256};

const SEPARATOR: &str = "|";

/// Pattern of the embedded author label, shared with the classifier.
pub(crate) const AUTHOR_LABEL: &str = r"(?im)autor[ \t]*:[ \t]*([^\n\r|,]+)";

/// Derives deduplication keys from message content.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    author: Regex,
    timestamp: Regex,
    quantity_prefix: Regex,
    quantity_suffix: Regex,
    item: Regex,
    item_name: Regex,
    amount: Regex,
    animals_before: Regex,
    animals_after: Regex,
}

impl Fingerprinter {
    /// Compiles the scanning patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            author: Regex::new(AUTHOR_LABEL)?,
            timestamp: Regex::new(r"\d{2}/\d{2}/\d{4},\s*\d{2}:\d{2}:\d{2}")?,
            quantity_prefix: Regex::new(r"(?i)\b(\d+)x\b")?,
            quantity_suffix: Regex::new(r"(?i)\s[x×]\s*(\d+)\b")?,
            item: Regex::new(r"(?im)(?:adicionad[oa]|removid[oa]|added|removed)\s*:\s*(.+)$")?,
            item_name: Regex::new(r"(?i)^(?:\d+\s*[x×]\s+)?(.+?)(?:\s*[x×]\s*\d+)?$")?,
            amount: Regex::new(r"\$\s*(\d[\d.,]*)")?,
            animals_before: Regex::new(r"(?i)(\d+)\s+animais\b")?,
            animals_after: Regex::new(r"(?i)\banimais\s*:?\s*(\d+)")?,
        })
    }

    /// Builds the key for `message`. Byte-identical content always yields the
    /// same key; the delivery id never contributes.
    #[must_use]
    pub fn fingerprint(&self, message: &RawMessage) -> String {
        let text = strip_inline_markup(&message.text());

        let author = self
            .author
            .captures(&text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| message.author.trim().to_string());

        let timestamp = self
            .timestamp
            .find(&text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let quantity = first_group(&self.quantity_prefix, &text)
            .or_else(|| first_group(&self.quantity_suffix, &text))
            .unwrap_or_default();

        let item = first_group(&self.item, &text)
            .and_then(|line| first_group(&self.item_name, line.trim()))
            .map(|name| name.trim().to_string())
            .unwrap_or_default();

        let amount = first_group(&self.amount, &text).unwrap_or_default();

        let animals = first_group(&self.animals_before, &text)
            .or_else(|| first_group(&self.animals_after, &text))
            .unwrap_or_default();

        let mut key = [
            author.as_str(),
            timestamp.as_str(),
            quantity,
            item.as_str(),
            amount,
            animals,
        ]
        .join(SEPARATOR);

        if timestamp.is_empty()
            && quantity.is_empty()
            && item.is_empty()
            && amount.is_empty()
            && animals.is_empty()
        {
            key.push_str(SEPARATOR);
            key.push_str(&content_hash(text.trim()));
        }

        key
    }
}

fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn first_group<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
