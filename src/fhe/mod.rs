//! Encryption service integration module
//!
//! Client traits and types for the external homomorphic encryption service that
//! produces encrypted inputs and verifies decryptions against the ledger contract.

/// Service and submission callback traits
mod client;
/// Encrypted input, decryption result and clear-value codec
mod types;

pub use client::{DecryptionSubmitter, EncryptionService};
pub use types::*;
