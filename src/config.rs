//! Dashboard configuration.
//!
//! Loaded from an optional JSON file; every field has a default so an empty object
//! (or no file at all) gives a working configuration.

use crate::ledger::Address;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("Invalid contract address: {0}")]
	InvalidAddress(String),
}

/// Settings for the record orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
	/// Contract that ciphertexts are bound to. When unset, the address reported by
	/// the read-only contract handle is used.
	pub contract_address: Option<String>,
	/// How long a success status stays visible, in milliseconds.
	pub success_status_ms: u64,
	/// How long an error status stays visible, in milliseconds.
	pub error_status_ms: u64,
	/// Label passed to `createBusinessData`.
	pub record_label: String,
	/// Prefix of generated business identifiers.
	pub business_id_prefix: String,
}

impl Default for DashboardConfig {
	fn default() -> Self {
		Self {
			contract_address: None,
			success_status_ms: 2000,
			error_status_ms: 3000,
			record_label: "Tax Record".to_string(),
			business_id_prefix: "tax-".to_string(),
		}
	}
}

impl DashboardConfig {
	/// Read a configuration file.
	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		Self::from_json(&raw)
	}

	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(raw)?;
		config.contract_address()?;
		Ok(config)
	}

	/// Parsed `contract_address`, if configured.
	pub fn contract_address(&self) -> Result<Option<Address>, ConfigError> {
		self.contract_address
			.as_deref()
			.map(|raw| Address::parse(raw).map_err(|e| ConfigError::InvalidAddress(e.to_string())))
			.transpose()
	}

	pub fn success_display(&self) -> Duration {
		Duration::from_millis(self.success_status_ms)
	}

	pub fn error_display(&self) -> Duration {
		Duration::from_millis(self.error_status_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_object_gives_defaults() {
		let config = DashboardConfig::from_json("{}").unwrap();
		assert_eq!(config, DashboardConfig::default());
		assert_eq!(config.success_display(), Duration::from_secs(2));
		assert_eq!(config.error_display(), Duration::from_secs(3));
	}

	#[test]
	fn partial_override_keeps_other_defaults() {
		let config = DashboardConfig::from_json(
			r#"{"error_status_ms": 500, "contract_address": "0x00000000000000000000000000000000000000c0"}"#,
		)
		.unwrap();
		assert_eq!(config.error_status_ms, 500);
		assert_eq!(config.success_status_ms, 2000);

		let mut expected = [0u8; 20];
		expected[19] = 0xc0;
		assert_eq!(config.contract_address().unwrap(), Some(Address(expected)));
	}

	#[test]
	fn bad_contract_address_is_rejected() {
		let result = DashboardConfig::from_json(r#"{"contract_address": "0x1234"}"#);
		assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
	}
}
