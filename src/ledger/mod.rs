//! Ledger contract integration module
//!
//! This module provides the client traits and types for talking to the smart contract
//! that stores tax records. Records are keyed by a string business identifier and carry
//! an encrypted income handle next to their public fields.

/// Read-only and signer-bound contract handles
mod client;
/// Type definitions for contract data
mod types;

pub use client::{LedgerContract, LedgerSigner};
pub use types::*;
