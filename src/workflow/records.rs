//! Tax record model.
//!
//! A `TaxRecord` is the workflow's view of one ledger entry. Its income is revealed in
//! two distinct trust states: a value cleared locally by this client, which is shown
//! but never authoritative, and the value the contract stored after a successful
//! on-chain verification.

use crate::ledger::{Address, BusinessData, BusinessId};
use crate::workflow::form::parse_leading_integer;

use serde::Serialize;

/// One record as presented to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxRecord {
	/// Leading digits of the business key after its prefix, or the load time in
	/// milliseconds when there are none.
	pub id: u64,
	pub business_id: BusinessId,
	pub name: String,
	/// Seconds since the Unix epoch.
	pub timestamp: u64,
	pub creator: Address,
	/// Public deduction figure.
	pub public_value1: u64,
	pub public_value2: u64,
	pub is_verified: bool,
	/// Cleartext income stored by the contract; present only once verified.
	pub decrypted_value: Option<u64>,
}

impl TaxRecord {
	/// Map contract fields into a record.
	pub fn from_business_data(
		business_id: BusinessId,
		data: BusinessData,
		id_prefix: &str,
		now_millis: u64,
	) -> Self {
		let id = match parse_leading_integer(&business_id.as_str().replacen(id_prefix, "", 1)) {
			0 => now_millis,
			id => id,
		};

		let decrypted_value = data
			.is_verified
			.then(|| coerce_number(&data.decrypted_value));

		Self {
			id,
			business_id,
			name: data.name,
			timestamp: data.timestamp,
			creator: data.creator,
			public_value1: coerce_number(&data.public_value1),
			public_value2: coerce_number(&data.public_value2),
			is_verified: data.is_verified,
			decrypted_value,
		}
	}

	/// Public deduction figure.
	pub fn deduction(&self) -> u64 {
		self.public_value1
	}

	/// Authoritative income, if the contract has verified one.
	pub fn verified_income(&self) -> Option<u64> {
		if self.is_verified {
			self.decrypted_value
		} else {
			None
		}
	}
}

/// Read a contract numeric field, treating anything unreadable as zero.
pub fn coerce_number(raw: &str) -> u64 {
	raw.trim().parse().unwrap_or(0)
}

/// Trust state of a record's income as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeReveal {
	Hidden,
	/// Cleared by this client; not yet confirmed by the contract.
	Local(u64),
	/// Stored by the contract after verification.
	Verified(u64),
}

/// Reveal toggle for one opened record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReveal {
	pub business_id: BusinessId,
	local_income: Option<u64>,
}

impl RecordReveal {
	pub fn new(business_id: BusinessId) -> Self {
		Self {
			business_id,
			local_income: None,
		}
	}

	pub fn local_income(&self) -> Option<u64> {
		self.local_income
	}

	pub(crate) fn show(&mut self, income: u64) {
		self.local_income = Some(income);
	}

	pub(crate) fn hide(&mut self) {
		self.local_income = None;
	}

	/// Income as it should be displayed for `record`. A verified value always wins
	/// over a local one.
	pub fn income_of(&self, record: &TaxRecord) -> IncomeReveal {
		match (record.verified_income(), self.local_income) {
			(Some(verified), _) => IncomeReveal::Verified(verified),
			(None, Some(local)) => IncomeReveal::Local(local),
			(None, None) => IncomeReveal::Hidden,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn data(verified: bool, decrypted: &str) -> BusinessData {
		BusinessData {
			name: "Acme Ltd".to_string(),
			timestamp: 1_700_000_000,
			creator: Address([7; 20]),
			public_value1: "12000".to_string(),
			public_value2: "not-a-number".to_string(),
			is_verified: verified,
			decrypted_value: decrypted.to_string(),
		}
	}

	#[test]
	fn maps_contract_fields() {
		let record = TaxRecord::from_business_data(
			BusinessId::new("tax-1700000000123"),
			data(true, "88000"),
			"tax-",
			5,
		);
		assert_eq!(record.id, 1_700_000_000_123);
		assert_eq!(record.deduction(), 12_000);
		assert_eq!(record.public_value2, 0);
		assert_eq!(record.verified_income(), Some(88_000));
	}

	#[test]
	fn unparsable_key_uses_load_time() {
		let record = TaxRecord::from_business_data(
			BusinessId::new("imported-7"),
			data(false, "0"),
			"tax-",
			42,
		);
		assert_eq!(record.id, 42);
		assert_eq!(record.decrypted_value, None);
	}

	#[test]
	fn key_id_takes_leading_digits_after_prefix() {
		let id_of = |key: &str| {
			TaxRecord::from_business_data(BusinessId::new(key), data(false, "0"), "tax-", 42).id
		};
		assert_eq!(id_of("tax-123abc"), 123);
		assert_eq!(id_of("tax- 77"), 77);
		assert_eq!(id_of("tax-0"), 42);
		assert_eq!(id_of("tax-"), 42);
	}

	#[test]
	fn verified_value_wins_over_local_reveal() {
		let mut reveal = RecordReveal::new(BusinessId::new("tax-1"));
		let unverified =
			TaxRecord::from_business_data(BusinessId::new("tax-1"), data(false, "0"), "tax-", 0);
		assert_eq!(reveal.income_of(&unverified), IncomeReveal::Hidden);

		reveal.show(70_000);
		assert_eq!(reveal.income_of(&unverified), IncomeReveal::Local(70_000));

		let verified =
			TaxRecord::from_business_data(BusinessId::new("tax-1"), data(true, "71000"), "tax-", 0);
		assert_eq!(reveal.income_of(&verified), IncomeReveal::Verified(71_000));

		reveal.hide();
		assert_eq!(reveal.local_income(), None);
	}
}
