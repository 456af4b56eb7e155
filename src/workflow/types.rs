use crate::config::ConfigError;
use crate::fhe::FheError;
use crate::ledger::{Address, LedgerError};
use crate::workflow::operations::OperationKind;

/// Message fragment wallets put in signature rejections.
const USER_REJECTED_TEXT: &str = "user rejected transaction";
/// Message fragment the contract reverts with on a repeated verification.
const ALREADY_VERIFIED_TEXT: &str = "Data already verified";

/// Wallet connection as reported by the wallet provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletConnection {
	#[default]
	Disconnected,
	Connected {
		account: Address,
	},
}

impl WalletConnection {
	pub fn account(&self) -> Option<Address> {
		match self {
			WalletConnection::Connected { account } => Some(*account),
			WalletConnection::Disconnected => None,
		}
	}

	pub fn is_connected(&self) -> bool {
		matches!(self, WalletConnection::Connected { .. })
	}
}

/// Error types for record lifecycle actions
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkflowError {
	#[error("Please connect wallet first")]
	WalletNotConnected,

	#[error("Record form is incomplete")]
	IncompleteForm,

	#[error("A {0} operation is already in flight")]
	Busy(OperationKind),

	#[error("Encryption service did not submit a verification transaction")]
	NoVerificationSubmitted,

	#[error("Configuration error: {0}")]
	ConfigError(String),

	#[error(transparent)]
	LedgerError(#[from] LedgerError),

	#[error(transparent)]
	FheError(#[from] FheError),
}

impl From<ConfigError> for WorkflowError {
	fn from(e: ConfigError) -> Self {
		WorkflowError::ConfigError(e.to_string())
	}
}

impl WorkflowError {
	fn ledger_cause(&self) -> Option<&LedgerError> {
		match self {
			WorkflowError::LedgerError(e) => Some(e),
			WorkflowError::FheError(FheError::Submission(e)) => Some(e),
			_ => None,
		}
	}

	/// The wallet declined to sign.
	///
	/// Uses the structured kind when the contract client reports one, and falls back
	/// to matching the wallet's message text for untyped provider errors.
	pub fn is_user_rejection(&self) -> bool {
		matches!(self.ledger_cause(), Some(LedgerError::UserRejected))
			|| self.to_string().contains(USER_REJECTED_TEXT)
	}

	/// The contract refused a verification because one already succeeded.
	///
	/// Same fallback rules as [`WorkflowError::is_user_rejection`].
	pub fn is_already_verified(&self) -> bool {
		matches!(self.ledger_cause(), Some(LedgerError::AlreadyVerified))
			|| self.to_string().contains(ALREADY_VERIFIED_TEXT)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ledger::BusinessId;

	#[test]
	fn structured_kinds_are_classified() {
		let rejected = WorkflowError::from(LedgerError::UserRejected);
		assert!(rejected.is_user_rejection());
		assert!(!rejected.is_already_verified());

		let through_callback =
			WorkflowError::from(FheError::Submission(LedgerError::AlreadyVerified));
		assert!(through_callback.is_already_verified());
		assert!(!through_callback.is_user_rejection());
	}

	#[test]
	fn untyped_messages_fall_back_to_text() {
		let reverted = WorkflowError::from(LedgerError::Reverted(
			"execution reverted: Data already verified".to_string(),
		));
		assert!(reverted.is_already_verified());

		let provider = WorkflowError::from(FheError::Encryption(
			"MetaMask Tx Signature: user rejected transaction".to_string(),
		));
		assert!(provider.is_user_rejection());

		let other = WorkflowError::from(LedgerError::NotFound(BusinessId::new("tax-1")));
		assert!(!other.is_user_rejection());
		assert!(!other.is_already_verified());
	}

	#[test]
	fn transparent_errors_keep_raw_message() {
		let e = WorkflowError::from(LedgerError::Reverted("out of gas".to_string()));
		assert_eq!(e.to_string(), "out of gas");
	}
}
