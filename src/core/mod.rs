//! Core business logic - framework-agnostic parsing, deduplication, ingestion
//! and payout operations.

/// Activity classification (the pipeline entry point)
pub mod classifier;
/// Duplicate delivery filtering
pub mod dedupe;
/// Per-shape field matchers
pub mod extract;
/// Content fingerprints
pub mod fingerprint;
/// Batch ingestion into the activity table
pub mod ingest;
/// Item identifier to display name mapping
pub mod items;
/// Worker payout reconciliation
pub mod payout;
/// Receipt persistence and queries
pub mod receipt;
/// Markup cleanup, truncation and number parsing
pub mod text;

pub use classifier::ActivityParser;
