//! Simulated encryption service backed by the [`KeyGateway`].

use super::gateway::KeyGateway;
use crate::fhe::{
	DecryptionResult, DecryptionSubmitter, EncryptedInput, EncryptionService, FheError,
	encode_clear_values,
};
use crate::ledger::{Address, CiphertextHandle};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Call counters, read by tests to assert which service paths ran.
#[derive(Debug, Default)]
pub struct CallCounts {
	pub initialize: AtomicUsize,
	pub encrypt: AtomicUsize,
	pub verify_decryption: AtomicUsize,
}

/// In-process stand-in for the encryption SDK.
pub struct SimulatedFhe {
	gateway: Arc<KeyGateway>,
	initialized: AtomicBool,
	encrypting: AtomicUsize,
	fail_initialization: AtomicBool,
	latency: Duration,
	calls: CallCounts,
}

impl SimulatedFhe {
	pub fn new(gateway: Arc<KeyGateway>) -> Self {
		Self {
			gateway,
			initialized: AtomicBool::new(false),
			encrypting: AtomicUsize::new(0),
			fail_initialization: AtomicBool::new(false),
			latency: Duration::ZERO,
			calls: CallCounts::default(),
		}
	}

	/// Delay every service call by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}

	/// Make `initialize` fail until reset.
	#[cfg(test)]
	pub fn fail_initialization(&self, fail: bool) {
		self.fail_initialization.store(fail, Ordering::SeqCst);
	}

	#[cfg(test)]
	pub fn calls(&self) -> &CallCounts {
		&self.calls
	}

	async fn simulate_latency(&self) {
		if !self.latency.is_zero() {
			tokio::time::sleep(self.latency).await;
		}
	}
}

/// Decrements the encrypting counter when an `encrypt` call ends.
struct EncryptingGuard<'a>(&'a AtomicUsize);

impl Drop for EncryptingGuard<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

#[async_trait::async_trait]
impl EncryptionService for SimulatedFhe {
	async fn initialize(&self) -> Result<(), FheError> {
		self.calls.initialize.fetch_add(1, Ordering::SeqCst);
		self.simulate_latency().await;

		if self.fail_initialization.load(Ordering::SeqCst) {
			return Err(FheError::Initialization(
				"public key fetch from gateway failed".to_string(),
			));
		}
		self.initialized.store(true, Ordering::SeqCst);
		Ok(())
	}

	fn is_initialized(&self) -> bool {
		self.initialized.load(Ordering::SeqCst)
	}

	fn is_encrypting(&self) -> bool {
		self.encrypting.load(Ordering::SeqCst) > 0
	}

	async fn encrypt(
		&self,
		contract: &Address,
		account: &Address,
		value: u64,
	) -> Result<EncryptedInput, FheError> {
		if !self.is_initialized() {
			return Err(FheError::NotInitialized);
		}
		if *contract == Address([0u8; 20]) {
			return Err(FheError::Encryption(
				"input cannot be bound to the zero address".to_string(),
			));
		}
		self.calls.encrypt.fetch_add(1, Ordering::SeqCst);
		self.encrypting.fetch_add(1, Ordering::SeqCst);
		let _guard = EncryptingGuard(&self.encrypting);

		self.simulate_latency().await;
		let (handle, proof) = self.gateway.seal(contract, account, value);
		debug!("Encrypted input for {} as {}", contract, handle);

		Ok(EncryptedInput {
			encrypted_data: handle.0.to_vec(),
			proof,
		})
	}

	async fn verify_decryption(
		&self,
		handles: &[CiphertextHandle],
		contract: &Address,
		submitter: &dyn DecryptionSubmitter,
	) -> Result<DecryptionResult, FheError> {
		if !self.is_initialized() {
			return Err(FheError::NotInitialized);
		}
		self.calls.verify_decryption.fetch_add(1, Ordering::SeqCst);
		self.simulate_latency().await;

		let mut clear_values = HashMap::new();
		let mut ordered = Vec::with_capacity(handles.len());
		for handle in handles {
			let value = self
				.gateway
				.clear(handle)
				.ok_or(FheError::UnknownHandle(*handle))?;
			clear_values.insert(*handle, value);
			ordered.push(value);
		}

		let encoded = encode_clear_values(&ordered);
		let proof = self.gateway.decryption_proof(handles, &encoded);
		let tx_hash = submitter.submit(&encoded, &proof).await?;
		debug!(
			"Submitted decryption of {} handle(s) for {} in {}",
			handles.len(),
			contract,
			tx_hash
		);

		Ok(DecryptionResult { clear_values })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn encrypt_requires_initialization_and_a_contract() {
		let gateway = Arc::new(KeyGateway::new());
		let fhe = SimulatedFhe::new(gateway.clone());
		let account = Address([0xa1; 20]);

		assert!(matches!(
			fhe.encrypt(&Address([0xc0; 20]), &account, 1).await,
			Err(FheError::NotInitialized)
		));

		fhe.initialize().await.unwrap();
		assert!(matches!(
			fhe.encrypt(&Address([0u8; 20]), &account, 1).await,
			Err(FheError::Encryption(_))
		));

		let input = fhe.encrypt(&Address([0xc0; 20]), &account, 42).await.unwrap();
		let handle = CiphertextHandle(input.encrypted_data.as_slice().try_into().unwrap());
		assert_eq!(gateway.clear(&handle), Some(42));
		assert!(!fhe.is_encrypting());
		assert_eq!(fhe.calls().encrypt.load(Ordering::SeqCst), 1);
	}
}
