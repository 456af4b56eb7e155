//! Types for the tax ledger contract surface

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
	/// Parse a `0x`-prefixed (or bare) hex address.
	pub fn parse(value: &str) -> Result<Self, LedgerError> {
		let trimmed = value.trim();
		let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
		let bytes = hex::decode(digits)
			.map_err(|e| LedgerError::InvalidAddress(format!("{}: {}", value, e)))?;
		let array: [u8; 20] = bytes.try_into().map_err(|_| {
			LedgerError::InvalidAddress(format!("{}: expected 20 bytes", value))
		})?;
		Ok(Self(array))
	}

	/// Lowercase `0x`-prefixed hex form.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.0))
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

/// String key under which a record is stored in the ledger contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessId(pub String);

impl BusinessId {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for BusinessId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Opaque on-chain reference to an encrypted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(pub [u8; 32]);

impl CiphertextHandle {
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.0))
	}
}

impl fmt::Display for CiphertextHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

/// Hash of a submitted ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

/// Confirmation of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
	pub tx_hash: TxHash,
	pub block_number: u64,
}

/// Raw record fields as returned by `getBusinessData`.
///
/// Numeric fields are carried as the contract's decimal strings; the workflow
/// layer coerces them and treats unreadable values as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessData {
	pub name: String,
	/// Creation time, seconds since the Unix epoch.
	pub timestamp: u64,
	pub creator: Address,
	#[serde(rename = "publicValue1")]
	pub public_value1: String,
	#[serde(rename = "publicValue2")]
	pub public_value2: String,
	#[serde(rename = "isVerified")]
	pub is_verified: bool,
	#[serde(rename = "decryptedValue")]
	pub decrypted_value: String,
}

/// Error types for ledger contract calls
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
	#[error("Record not found: {0}")]
	NotFound(BusinessId),

	#[error("Record already exists: {0}")]
	AlreadyExists(BusinessId),

	/// The wallet refused to sign the transaction.
	#[error("user rejected transaction")]
	UserRejected,

	/// The record's decryption has already been verified on-chain.
	#[error("Data already verified")]
	AlreadyVerified,

	#[error("Invalid proof: {0}")]
	InvalidProof(String),

	#[error("Invalid address: {0}")]
	InvalidAddress(String),

	#[error("Unknown transaction: {0}")]
	UnknownTransaction(TxHash),

	/// Revert or provider failure whose kind is only known from its message.
	#[error("{0}")]
	Reverted(String),
}
