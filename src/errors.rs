//! Unified error type for the ledger.
//!
//! Extraction misses and classification fallbacks are not errors and never show
//! up here; only configuration, persistence and framework failures do.

use thiserror::Error;

/// All failures surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any error reported by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting a reply or summary failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// A log-line pattern failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// No receipt exists with the given identifier
    #[error("Receipt not found: {receipt_id}")]
    ReceiptNotFound {
        /// External receipt identifier
        receipt_id: String,
    },

    /// The receipt was paid by someone else between read and write
    #[error("Receipt {receipt_id} was already paid")]
    ReceiptAlreadyPaid {
        /// External receipt identifier
        receipt_id: String,
    },

    /// A monetary value was negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// Serenity/Poise failure while running the bot
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
