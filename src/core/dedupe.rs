//! Deduplication of repeated deliveries.
//!
//! One pass holds its own set of seen fingerprints; nothing is kept between
//! calls. To make a backfill idempotent against what was already stored, pass
//! the stored fingerprints as `known` (see `core::ingest`). Live messages and
//! backfills go through the same function, so they agree on what a repeat is.

use crate::core::fingerprint::Fingerprinter;
use crate::models::RawMessage;
use std::collections::HashSet;
use tracing::debug;

/// A message that survived deduplication, with its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprinted {
    /// Deduplication key
    pub fingerprint: String,
    /// The first delivery carrying that key
    pub message: RawMessage,
}

/// Keeps the first message of every fingerprint, in arrival order.
#[must_use]
pub fn dedupe<I>(fingerprinter: &Fingerprinter, messages: I) -> Vec<RawMessage>
where
    I: IntoIterator<Item = RawMessage>,
{
    dedupe_against(fingerprinter, messages, &HashSet::new())
        .into_iter()
        .map(|kept| kept.message)
        .collect()
}

/// Keeps the first message of every fingerprint not already in `known`.
#[must_use]
pub fn dedupe_against<I>(
    fingerprinter: &Fingerprinter,
    messages: I,
    known: &HashSet<String>,
) -> Vec<Fingerprinted>
where
    I: IntoIterator<Item = RawMessage>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();

    for message in messages {
        let fingerprint = fingerprinter.fingerprint(&message);
        if known.contains(&fingerprint) || !seen.insert(fingerprint.clone()) {
            debug!(message_id = %message.id, %fingerprint, "dropping repeated message");
            continue;
        }
        kept.push(Fingerprinted {
            fingerprint,
            message,
        });
    }

    kept
}
