//! Record Lifecycle Workflow Module
//!
//! This module holds the orchestration logic that sits between the presentation layer and
//! the two external collaborators (the encryption service and the ledger contract):
//!
//! - `orchestrator`: The entry point. Initializes the encryption service, loads records,
//!   creates encrypted records and runs the decrypt / verify round.
//! - `operations`: Per-kind operation state tokens used as busy flags and start guards.
//! - `status`: The self-clearing transaction status notifier.
//! - `records`: The `TaxRecord` model, contract field mapping and income trust states.
//! - `form`: The create-record form model and its validation.
//! - `types`: Wallet connection state and the workflow error type.

/// Create-record form model
pub mod form;
/// Operation state tokens
pub mod operations;
/// Main coordinator for the record lifecycle
pub mod orchestrator;
/// Tax record model and income reveal states
pub mod records;
/// Transaction status notifications
pub mod status;
/// Connection state and errors
pub mod types;

pub use form::RecordForm;
pub use operations::{OperationBoard, OperationKind, OperationState};
pub use orchestrator::RecordOrchestrator;
pub use records::{IncomeReveal, RecordReveal, TaxRecord};
pub use status::{StatusKind, StatusNotifier, TransactionStatus};
pub use types::{WalletConnection, WorkflowError};
