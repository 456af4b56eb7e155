//! Derived views over tax records
//!
//! Stateless projections the presentation layer renders: per-record tax analysis and
//! dashboard-wide statistics with the record search filter.

/// Per-record tax metrics
pub mod projection;
/// Dashboard aggregates and search
pub mod stats;

pub use projection::{TaxAnalysis, analyze_tax};
pub use stats::{DashboardStats, filter_records};
