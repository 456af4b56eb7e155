//! Types for the encryption service integration

use crate::ledger::{CiphertextHandle, LedgerError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Width of one ABI word in an encoded clear-value list.
pub const ABI_WORD_BYTES: usize = 32;

/// Ciphertext and input proof produced by `encrypt`.
///
/// Both halves are bound to the contract address and the encrypting account; the
/// contract rejects them when submitted by anyone else or to another contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
	#[serde(rename = "encryptedData")]
	pub encrypted_data: Vec<u8>,
	pub proof: Vec<u8>,
}

/// Outcome of a decryption verification round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptionResult {
	/// Cleared value per requested handle.
	pub clear_values: HashMap<CiphertextHandle, u64>,
}

impl DecryptionResult {
	pub fn value_of(&self, handle: &CiphertextHandle) -> Option<u64> {
		self.clear_values.get(handle).copied()
	}
}

/// ABI-encode clear values as consecutive 32-byte big-endian words.
pub fn encode_clear_values(values: &[u64]) -> Vec<u8> {
	let mut encoded = Vec::with_capacity(values.len() * ABI_WORD_BYTES);
	for value in values {
		encoded.extend_from_slice(&[0u8; ABI_WORD_BYTES - 8]);
		encoded.extend_from_slice(&value.to_be_bytes());
	}
	encoded
}

/// Decode a list produced by [`encode_clear_values`].
pub fn decode_clear_values(encoded: &[u8]) -> Result<Vec<u64>, FheError> {
	if encoded.len() % ABI_WORD_BYTES != 0 {
		return Err(FheError::Decryption(format!(
			"Encoded clear values have length {}, not a multiple of {}",
			encoded.len(),
			ABI_WORD_BYTES
		)));
	}

	encoded
		.chunks(ABI_WORD_BYTES)
		.map(|word| {
			let (high, low) = word.split_at(ABI_WORD_BYTES - 8);
			if high.iter().any(|b| *b != 0) {
				return Err(FheError::Decryption(
					"Clear value does not fit in 64 bits".to_string(),
				));
			}
			let mut bytes = [0u8; 8];
			bytes.copy_from_slice(low);
			Ok(u64::from_be_bytes(bytes))
		})
		.collect()
}

/// Error types for encryption service operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum FheError {
	#[error("Encryption service is not initialized")]
	NotInitialized,

	#[error("Initialization error: {0}")]
	Initialization(String),

	#[error("Encryption error: {0}")]
	Encryption(String),

	#[error("Decryption error: {0}")]
	Decryption(String),

	#[error("Unknown ciphertext handle: {0}")]
	UnknownHandle(CiphertextHandle),

	/// The submission callback failed; carries the contract's own error.
	#[error("{0}")]
	Submission(#[from] LedgerError),
}
