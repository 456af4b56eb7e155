//! In-memory tax ledger contract.
//!
//! Transactions are applied as soon as they are submitted and each one is mined into
//! its own block; `wait_for_receipt` returns the stored receipt. Fault injection hooks
//! let callers reproduce partial read failures, signature rejection, stale reads and
//! raw revert messages and slow reads. Stale reads are one-shot.

use super::gateway::KeyGateway;
use crate::fhe::decode_clear_values;
use crate::ledger::{
	Address, BusinessData, BusinessId, CiphertextHandle, LedgerContract, LedgerError,
	LedgerSigner, TxHash, TxReceipt,
};

use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredRecord {
	data: BusinessData,
	handle: CiphertextHandle,
	label: String,
}

#[derive(Debug, Default)]
struct ContractState {
	/// Identifiers in creation order, as enumerated by `getAllBusinessIds`.
	order: Vec<BusinessId>,
	records: HashMap<BusinessId, StoredRecord>,
	receipts: HashMap<TxHash, TxReceipt>,
	block_number: u64,
}

#[derive(Debug, Default)]
struct Faults {
	failing_reads: HashSet<BusinessId>,
	stale_reads: HashSet<BusinessId>,
	reject_signatures: bool,
	verify_revert: Option<String>,
	read_delay: Duration,
}

#[derive(Debug)]
struct Inner {
	address: Address,
	gateway: Arc<KeyGateway>,
	state: Mutex<ContractState>,
	faults: Mutex<Faults>,
	encrypted_value_reads: AtomicUsize,
}

/// Simulated ledger contract backed by process memory.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
	inner: Arc<Inner>,
}

impl InMemoryLedger {
	pub fn new(address: Address, gateway: Arc<KeyGateway>) -> Self {
		Self {
			inner: Arc::new(Inner {
				address,
				gateway,
				state: Mutex::new(ContractState::default()),
				faults: Mutex::new(Faults::default()),
				encrypted_value_reads: AtomicUsize::new(0),
			}),
		}
	}

	/// Make `getBusinessData(id)` fail.
	#[cfg(test)]
	pub fn fail_reads_of(&self, id: &BusinessId) {
		self.faults().failing_reads.insert(id.clone());
	}

	/// Make the next `getBusinessData(id)` report the record as not yet verified.
	#[cfg(test)]
	pub fn serve_stale_read_of(&self, id: &BusinessId) {
		self.faults().stale_reads.insert(id.clone());
	}

	/// Number of `getEncryptedValue` calls served.
	#[cfg(test)]
	pub fn encrypted_value_reads(&self) -> usize {
		self.inner.encrypted_value_reads.load(Ordering::SeqCst)
	}

	/// Make the wallet refuse to sign every following transaction.
	#[cfg(test)]
	pub fn reject_signatures(&self, reject: bool) {
		self.faults().reject_signatures = reject;
	}

	/// Revert every following `verifyDecryption` with a raw message.
	#[cfg(test)]
	pub fn revert_verifications_with(&self, message: impl Into<String>) {
		self.faults().verify_revert = Some(message.into());
	}

	/// Delay every `getBusinessData` call by `delay`.
	#[cfg(test)]
	pub fn delay_reads_by(&self, delay: Duration) {
		self.faults().read_delay = delay;
	}

	/// Label stored alongside a record.
	pub fn label_of(&self, id: &BusinessId) -> Option<String> {
		self.state().records.get(id).map(|record| record.label.clone())
	}

	fn state(&self) -> MutexGuard<'_, ContractState> {
		self.inner
			.state
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
	}

	fn faults(&self) -> MutexGuard<'_, Faults> {
		self.inner
			.faults
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
	}

	fn mine(state: &mut ContractState) -> TxHash {
		let mut bytes = [0u8; 32];
		rand::rng().fill(&mut bytes);
		let tx_hash = TxHash(bytes);

		state.block_number += 1;
		state.receipts.insert(
			tx_hash,
			TxReceipt {
				tx_hash,
				block_number: state.block_number,
			},
		);
		tx_hash
	}
}

#[async_trait::async_trait]
impl LedgerContract for InMemoryLedger {
	async fn address(&self) -> Result<Address, LedgerError> {
		Ok(self.inner.address)
	}

	async fn get_all_business_ids(&self) -> Result<Vec<BusinessId>, LedgerError> {
		Ok(self.state().order.clone())
	}

	async fn get_business_data(&self, id: &BusinessId) -> Result<BusinessData, LedgerError> {
		let (failing, stale, delay) = {
			let mut faults = self.faults();
			(
				faults.failing_reads.contains(id),
				faults.stale_reads.remove(id),
				faults.read_delay,
			)
		};
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		if failing {
			return Err(LedgerError::Reverted(format!(
				"call to getBusinessData({}) failed",
				id
			)));
		}

		let mut data = self
			.state()
			.records
			.get(id)
			.map(|record| record.data.clone())
			.ok_or_else(|| LedgerError::NotFound(id.clone()))?;

		if stale {
			data.is_verified = false;
			data.decrypted_value = "0".to_string();
		}
		Ok(data)
	}

	async fn get_encrypted_value(
		&self,
		id: &BusinessId,
	) -> Result<CiphertextHandle, LedgerError> {
		self.inner
			.encrypted_value_reads
			.fetch_add(1, Ordering::SeqCst);
		self.state()
			.records
			.get(id)
			.map(|record| record.handle)
			.ok_or_else(|| LedgerError::NotFound(id.clone()))
	}

	async fn wait_for_receipt(&self, tx: &TxHash) -> Result<TxReceipt, LedgerError> {
		self.state()
			.receipts
			.get(tx)
			.cloned()
			.ok_or(LedgerError::UnknownTransaction(*tx))
	}

	async fn with_signer(&self, account: &Address) -> Result<Arc<dyn LedgerSigner>, LedgerError> {
		Ok(Arc::new(SignerHandle {
			ledger: self.clone(),
			account: *account,
		}))
	}
}

/// `InMemoryLedger` bound to a signing account.
struct SignerHandle {
	ledger: InMemoryLedger,
	account: Address,
}

#[async_trait::async_trait]
impl LedgerSigner for SignerHandle {
	fn account(&self) -> Address {
		self.account
	}

	async fn create_business_data(
		&self,
		id: &BusinessId,
		name: &str,
		encrypted_data: &[u8],
		proof: &[u8],
		public_value1: u64,
		public_value2: u64,
		label: &str,
	) -> Result<TxHash, LedgerError> {
		if self.ledger.faults().reject_signatures {
			return Err(LedgerError::UserRejected);
		}

		let handle_bytes: [u8; 32] = encrypted_data.try_into().map_err(|_| {
			LedgerError::InvalidProof(format!(
				"ciphertext handle has {} bytes, expected 32",
				encrypted_data.len()
			))
		})?;
		let handle = CiphertextHandle(handle_bytes);

		self.ledger
			.inner
			.gateway
			.check_input(&handle, proof, &self.ledger.inner.address, &self.account)
			.map_err(LedgerError::InvalidProof)?;

		let mut state = self.ledger.state();
		if state.records.contains_key(id) {
			return Err(LedgerError::AlreadyExists(id.clone()));
		}

		let data = BusinessData {
			name: name.to_string(),
			timestamp: chrono::Utc::now().timestamp().max(0) as u64,
			creator: self.account,
			public_value1: public_value1.to_string(),
			public_value2: public_value2.to_string(),
			is_verified: false,
			decrypted_value: "0".to_string(),
		};
		state.order.push(id.clone());
		state.records.insert(
			id.clone(),
			StoredRecord {
				data,
				handle,
				label: label.to_string(),
			},
		);

		let tx_hash = InMemoryLedger::mine(&mut state);
		debug!("createBusinessData({}) mined as {}", id, tx_hash);
		Ok(tx_hash)
	}

	async fn verify_decryption(
		&self,
		id: &BusinessId,
		clear_values_encoded: &[u8],
		proof: &[u8],
	) -> Result<TxHash, LedgerError> {
		let revert = {
			let faults = self.ledger.faults();
			if faults.reject_signatures {
				return Err(LedgerError::UserRejected);
			}
			faults.verify_revert.clone()
		};
		if let Some(message) = revert {
			return Err(LedgerError::Reverted(message));
		}

		let mut state = self.ledger.state();
		let record = state
			.records
			.get_mut(id)
			.ok_or_else(|| LedgerError::NotFound(id.clone()))?;

		if record.data.is_verified {
			return Err(LedgerError::AlreadyVerified);
		}

		if !self
			.ledger
			.inner
			.gateway
			.check_decryption(&[record.handle], clear_values_encoded, proof)
		{
			return Err(LedgerError::InvalidProof(
				"decryption proof does not match handle".to_string(),
			));
		}

		let values = decode_clear_values(clear_values_encoded)
			.map_err(|e| LedgerError::InvalidProof(e.to_string()))?;
		let value = values
			.first()
			.copied()
			.ok_or_else(|| LedgerError::InvalidProof("no clear value".to_string()))?;

		record.data.is_verified = true;
		record.data.decrypted_value = value.to_string();

		let tx_hash = InMemoryLedger::mine(&mut state);
		debug!("verifyDecryption({}) mined as {}", id, tx_hash);
		Ok(tx_hash)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fhe::encode_clear_values;

	fn setup() -> (InMemoryLedger, Arc<KeyGateway>, Address, Address) {
		let gateway = Arc::new(KeyGateway::new());
		let contract = Address([0xc0; 20]);
		let account = Address([0xa1; 20]);
		(
			InMemoryLedger::new(contract, gateway.clone()),
			gateway,
			contract,
			account,
		)
	}

	#[tokio::test]
	async fn create_then_verify_persists_clear_value() {
		let (ledger, gateway, contract, account) = setup();
		let signer = ledger.with_signer(&account).await.unwrap();
		let id = BusinessId::new("tax-1");

		let (handle, proof) = gateway.seal(&contract, &account, 90_000);
		let tx = signer
			.create_business_data(&id, "Acme", &handle.0, &proof, 12_000, 0, "Tax Record")
			.await
			.unwrap();
		assert_eq!(ledger.wait_for_receipt(&tx).await.unwrap().block_number, 1);
		assert_eq!(ledger.label_of(&id).as_deref(), Some("Tax Record"));

		let data = ledger.get_business_data(&id).await.unwrap();
		assert_eq!(data.public_value1, "12000");
		assert!(!data.is_verified);

		let encoded = encode_clear_values(&[90_000]);
		let decryption_proof = gateway.decryption_proof(&[handle], &encoded);
		signer
			.verify_decryption(&id, &encoded, &decryption_proof)
			.await
			.unwrap();

		let data = ledger.get_business_data(&id).await.unwrap();
		assert!(data.is_verified);
		assert_eq!(data.decrypted_value, "90000");

		let again = signer
			.verify_decryption(&id, &encoded, &decryption_proof)
			.await;
		assert!(matches!(again, Err(LedgerError::AlreadyVerified)));
	}

	#[tokio::test]
	async fn create_rejects_ciphertext_from_other_account() {
		let (ledger, gateway, contract, account) = setup();
		let (handle, proof) = gateway.seal(&contract, &Address([0xee; 20]), 1);
		let signer = ledger.with_signer(&account).await.unwrap();

		let result = signer
			.create_business_data(&BusinessId::new("tax-2"), "X", &handle.0, &proof, 0, 0, "")
			.await;
		assert!(matches!(result, Err(LedgerError::InvalidProof(_))));
		assert!(ledger.get_all_business_ids().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn forged_decryption_is_rejected() {
		let (ledger, gateway, contract, account) = setup();
		let signer = ledger.with_signer(&account).await.unwrap();
		let id = BusinessId::new("tax-3");
		let (handle, proof) = gateway.seal(&contract, &account, 5);
		signer
			.create_business_data(&id, "Y", &handle.0, &proof, 0, 0, "")
			.await
			.unwrap();

		let forged = encode_clear_values(&[6]);
		let proof_for_real = gateway.decryption_proof(&[handle], &encode_clear_values(&[5]));
		let result = signer.verify_decryption(&id, &forged, &proof_for_real).await;
		assert!(matches!(result, Err(LedgerError::InvalidProof(_))));
	}

	#[tokio::test]
	async fn rejected_signature_has_structured_kind() {
		let (ledger, gateway, contract, account) = setup();
		ledger.reject_signatures(true);
		let signer = ledger.with_signer(&account).await.unwrap();
		let (handle, proof) = gateway.seal(&contract, &account, 1);

		let result = signer
			.create_business_data(&BusinessId::new("tax-4"), "Z", &handle.0, &proof, 0, 0, "")
			.await;
		assert!(matches!(result, Err(LedgerError::UserRejected)));
	}
}
