//! Simulated collaborators
//!
//! In-process implementations of the ledger contract and the encryption service. They
//! share a [`KeyGateway`] that plays the role of the encryption network's key holders,
//! so ciphertexts produced by [`SimulatedFhe`] can be checked and verified by
//! [`InMemoryLedger`] exactly as the real contract would.

/// Simulated encryption service
pub mod coprocessor;
/// Handle registry and proof signing
pub mod gateway;
/// In-memory ledger contract
pub mod ledger;

pub use coprocessor::SimulatedFhe;
pub use gateway::KeyGateway;
pub use ledger::InMemoryLedger;
