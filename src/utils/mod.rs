//!
//! Utility module for the tax dashboard.
//!
//! Re-exports formatting helpers used when rendering records and analyses.
/// Utility functions for formatting and display
pub mod index;

pub use index::{format_percent, short_address};
