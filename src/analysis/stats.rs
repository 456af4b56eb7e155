use crate::workflow::TaxRecord;

use serde::Serialize;

/// Window for the "created this week" counter, in seconds.
pub const RECENT_WINDOW_SECS: u64 = 60 * 60 * 24 * 7;

/// Aggregate figures shown on the dashboard panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
	pub total_records: usize,
	pub verified_records: usize,
	/// Records created within [`RECENT_WINDOW_SECS`] of `now`.
	pub recent_records: usize,
	pub average_deduction: f64,
	/// Mean verified income over all records, unverified ones counting as zero.
	pub average_income: u64,
	/// Share of verified records, rounded percent.
	pub verification_rate: u64,
}

impl DashboardStats {
	pub fn from_records(records: &[TaxRecord], now_secs: u64) -> Self {
		let total = records.len();
		if total == 0 {
			return Self {
				total_records: 0,
				verified_records: 0,
				recent_records: 0,
				average_deduction: 0.0,
				average_income: 0,
				verification_rate: 0,
			};
		}

		let verified = records.iter().filter(|r| r.is_verified).count();
		let recent = records
			.iter()
			.filter(|r| now_secs.saturating_sub(r.timestamp) < RECENT_WINDOW_SECS)
			.count();
		let deduction_sum: u64 = records.iter().map(|r| r.public_value1).sum();
		let income_sum: u64 = records
			.iter()
			.map(|r| r.decrypted_value.unwrap_or(0))
			.sum();

		Self {
			total_records: total,
			verified_records: verified,
			recent_records: recent,
			average_deduction: deduction_sum as f64 / total as f64,
			average_income: (income_sum as f64 / total as f64).round() as u64,
			verification_rate: (verified as f64 / total as f64 * 100.0).round() as u64,
		}
	}
}

/// Records whose name or creator contains `term`, ignoring case.
pub fn filter_records<'a>(records: &'a [TaxRecord], term: &str) -> Vec<&'a TaxRecord> {
	let needle = term.to_lowercase();
	records
		.iter()
		.filter(|r| {
			r.name.to_lowercase().contains(&needle)
				|| r.creator.to_hex().to_lowercase().contains(&needle)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ledger::{Address, BusinessId};

	const NOW: u64 = 1_700_000_000;

	fn record(name: &str, age_secs: u64, deduction: u64, verified: Option<u64>) -> TaxRecord {
		TaxRecord {
			id: 1,
			business_id: BusinessId::new(format!("tax-{}", name)),
			name: name.to_string(),
			timestamp: NOW - age_secs,
			creator: Address([0xab; 20]),
			public_value1: deduction,
			public_value2: 0,
			is_verified: verified.is_some(),
			decrypted_value: verified,
		}
	}

	#[test]
	fn empty_list_has_zero_stats() {
		let stats = DashboardStats::from_records(&[], NOW);
		assert_eq!(stats.total_records, 0);
		assert_eq!(stats.verification_rate, 0);
	}

	#[test]
	fn aggregates_over_records() {
		let records = vec![
			record("Acme", 60, 10_000, Some(90_000)),
			record("Globex", RECENT_WINDOW_SECS + 1, 20_000, None),
			record("Initech", 3_600, 0, Some(45_001)),
		];
		let stats = DashboardStats::from_records(&records, NOW);

		assert_eq!(stats.total_records, 3);
		assert_eq!(stats.verified_records, 2);
		assert_eq!(stats.recent_records, 2);
		assert_eq!(stats.average_deduction, 10_000.0);
		assert_eq!(stats.average_income, 45_000);
		assert_eq!(stats.verification_rate, 67);
	}

	#[test]
	fn search_matches_name_or_creator() {
		let records = vec![
			record("Acme Holdings", 0, 0, None),
			record("Globex", 0, 0, None),
		];
		assert_eq!(filter_records(&records, "acme").len(), 1);
		assert_eq!(filter_records(&records, "ABAB").len(), 2);
		assert_eq!(filter_records(&records, "").len(), 2);
		assert!(filter_records(&records, "umbrella").is_empty());
	}
}
