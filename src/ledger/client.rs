//!
//! Client traits for the tax ledger contract.
//!
//! The contract is reached through two handles: a read-only handle that anyone
//! can query, and a signer-bound handle obtained for the connected account that
//! submits state-changing transactions. Submissions return a transaction hash;
//! confirmation is awaited separately through the read-only handle.

use super::types::*;
use std::sync::Arc;

/// Read-only handle to the ledger contract.
#[async_trait::async_trait]
pub trait LedgerContract: Send + Sync {
	/// Address the contract is deployed at.
	async fn address(&self) -> Result<Address, LedgerError>;

	/// Every business identifier in the order the contract enumerates them.
	async fn get_all_business_ids(&self) -> Result<Vec<BusinessId>, LedgerError>;

	async fn get_business_data(&self, id: &BusinessId) -> Result<BusinessData, LedgerError>;

	/// Handle of the encrypted income stored for `id`.
	async fn get_encrypted_value(&self, id: &BusinessId)
	-> Result<CiphertextHandle, LedgerError>;

	/// Wait until `tx` is mined and return its receipt.
	async fn wait_for_receipt(&self, tx: &TxHash) -> Result<TxReceipt, LedgerError>;

	/// Bind a signer for `account`, used for state-changing calls.
	async fn with_signer(&self, account: &Address) -> Result<Arc<dyn LedgerSigner>, LedgerError>;
}

/// Signer-bound handle to the ledger contract.
#[async_trait::async_trait]
pub trait LedgerSigner: Send + Sync {
	/// Account that signs transactions sent through this handle.
	fn account(&self) -> Address;

	#[allow(clippy::too_many_arguments)]
	async fn create_business_data(
		&self,
		id: &BusinessId,
		name: &str,
		encrypted_data: &[u8],
		proof: &[u8],
		public_value1: u64,
		public_value2: u64,
		label: &str,
	) -> Result<TxHash, LedgerError>;

	/// Submit a cleared value and its decryption proof for on-chain checking.
	async fn verify_decryption(
		&self,
		id: &BusinessId,
		clear_values_encoded: &[u8],
		proof: &[u8],
	) -> Result<TxHash, LedgerError>;
}
