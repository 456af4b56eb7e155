//! Simulated key-management gateway.
//!
//! Holds the plaintext behind every ciphertext handle together with the contract and
//! account the ciphertext was produced for. Input proofs and decryption proofs are
//! SHA-256 digests over domain-separated fields, so the simulated contract can check
//! both bindings without seeing plaintext.

use crate::ledger::{Address, CiphertextHandle};

use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

const INPUT_PROOF_DOMAIN: &[u8] = b"tax-ledger/input-proof/v1";
const DECRYPTION_PROOF_DOMAIN: &[u8] = b"tax-ledger/decryption-proof/v1";

#[derive(Debug, Clone)]
struct SealedValue {
	value: u64,
	contract: Address,
	account: Address,
}

/// Shared secret state of the simulated encryption network.
#[derive(Debug, Default)]
pub struct KeyGateway {
	sealed: Mutex<HashMap<CiphertextHandle, SealedValue>>,
}

impl KeyGateway {
	pub fn new() -> Self {
		Self::default()
	}

	/// Encrypt `value` for `contract` and `account`, returning its handle and input proof.
	pub fn seal(
		&self,
		contract: &Address,
		account: &Address,
		value: u64,
	) -> (CiphertextHandle, Vec<u8>) {
		let mut bytes = [0u8; 32];
		rand::rng().fill(&mut bytes);
		let handle = CiphertextHandle(bytes);

		self.sealed
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(
				handle,
				SealedValue {
					value,
					contract: *contract,
					account: *account,
				},
			);

		(handle, input_proof(&handle, contract, account))
	}

	/// Check that `proof` binds `handle` to `contract` and `account`.
	pub fn check_input(
		&self,
		handle: &CiphertextHandle,
		proof: &[u8],
		contract: &Address,
		account: &Address,
	) -> Result<(), String> {
		let sealed = self
			.sealed
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(handle)
			.cloned()
			.ok_or_else(|| format!("unknown ciphertext {}", handle))?;

		if sealed.contract != *contract {
			return Err(format!(
				"ciphertext {} was encrypted for contract {}",
				handle, sealed.contract
			));
		}
		if sealed.account != *account {
			return Err(format!(
				"ciphertext {} was encrypted by {}",
				handle, sealed.account
			));
		}
		if proof != input_proof(handle, contract, account).as_slice() {
			return Err("input proof does not match ciphertext".to_string());
		}
		Ok(())
	}

	/// Plaintext behind `handle`.
	pub fn clear(&self, handle: &CiphertextHandle) -> Option<u64> {
		self.sealed
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(handle)
			.map(|sealed| sealed.value)
	}

	/// Sign the claim that `clear_values_encoded` is the decryption of `handles`.
	pub fn decryption_proof(
		&self,
		handles: &[CiphertextHandle],
		clear_values_encoded: &[u8],
	) -> Vec<u8> {
		let mut hasher = Sha256::new();
		hasher.update(DECRYPTION_PROOF_DOMAIN);
		for handle in handles {
			hasher.update(handle.0);
		}
		hasher.update(clear_values_encoded);
		hasher.finalize().to_vec()
	}

	pub fn check_decryption(
		&self,
		handles: &[CiphertextHandle],
		clear_values_encoded: &[u8],
		proof: &[u8],
	) -> bool {
		self.decryption_proof(handles, clear_values_encoded) == proof
	}
}

fn input_proof(handle: &CiphertextHandle, contract: &Address, account: &Address) -> Vec<u8> {
	let mut hasher = Sha256::new();
	hasher.update(INPUT_PROOF_DOMAIN);
	hasher.update(handle.0);
	hasher.update(contract.0);
	hasher.update(account.0);
	hasher.finalize().to_vec()
}
