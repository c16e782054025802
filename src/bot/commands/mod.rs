//! Discord command implementations organized by category.

/// Log-line classification preview
pub mod activity;

/// General utility commands
pub mod general;

/// Worker payout commands
pub mod payout;

// Export commands
pub use activity::*;
pub use general::*;
pub use payout::*;
