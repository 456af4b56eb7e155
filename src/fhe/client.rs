//!
//! Encryption service client traits.
//!
//! The service encrypts plaintext inputs for a specific contract and account, and runs
//! the decryption verification round: it clears a set of ciphertext handles, produces a
//! proof of correct decryption, and hands both to a caller-supplied submitter that sends
//! them to the contract. The proof is never exposed outside that callback.

use super::types::*;
use crate::ledger::{Address, CiphertextHandle, LedgerError, TxHash};

/// Callback invoked by the service once a cleared value and its proof exist.
#[async_trait::async_trait]
pub trait DecryptionSubmitter: Send + Sync {
	async fn submit(&self, clear_values_encoded: &[u8], proof: &[u8])
	-> Result<TxHash, LedgerError>;
}

/// Client for the homomorphic encryption service.
#[async_trait::async_trait]
pub trait EncryptionService: Send + Sync {
	/// Start the service. Callers guard against duplicate initialization.
	async fn initialize(&self) -> Result<(), FheError>;

	fn is_initialized(&self) -> bool;

	/// True while an `encrypt` call is running.
	fn is_encrypting(&self) -> bool;

	/// Encrypt `value` for `contract`, bound to `account`.
	async fn encrypt(
		&self,
		contract: &Address,
		account: &Address,
		value: u64,
	) -> Result<EncryptedInput, FheError>;

	/// Clear `handles`, prove the result, and submit both through `submitter`.
	async fn verify_decryption(
		&self,
		handles: &[CiphertextHandle],
		contract: &Address,
		submitter: &dyn DecryptionSubmitter,
	) -> Result<DecryptionResult, FheError>;
}
