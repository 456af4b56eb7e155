//! Create-record form model.

/// Fields of the "new tax record" form, kept as typed text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
	name: String,
	income: String,
	deduction: String,
}

impl RecordForm {
	pub fn new(name: &str, income: &str, deduction: &str) -> Self {
		let mut form = Self::default();
		form.set_name(name);
		form.set_income(income);
		form.set_deduction(deduction);
		form
	}

	pub fn set_name(&mut self, value: &str) {
		self.name = value.to_string();
	}

	/// Income only accepts digits; anything else typed is dropped.
	pub fn set_income(&mut self, value: &str) {
		self.income = value.chars().filter(|c| c.is_ascii_digit()).collect();
	}

	pub fn set_deduction(&mut self, value: &str) {
		self.deduction = value.to_string();
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn income(&self) -> &str {
		&self.income
	}

	pub fn deduction(&self) -> &str {
		&self.deduction
	}

	/// All three fields are filled in.
	pub fn is_complete(&self) -> bool {
		!self.name.is_empty() && !self.income.is_empty() && !self.deduction.is_empty()
	}

	pub fn income_value(&self) -> u64 {
		parse_leading_integer(&self.income)
	}

	pub fn deduction_value(&self) -> u64 {
		parse_leading_integer(&self.deduction)
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}
}

/// Integer formed by the leading digits of `raw` after whitespace, or 0.
pub(crate) fn parse_leading_integer(raw: &str) -> u64 {
	let digits: String = raw
		.trim_start()
		.trim_start_matches('+')
		.chars()
		.take_while(|c| c.is_ascii_digit())
		.collect();
	digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn income_is_sanitized_to_digits() {
		let mut form = RecordForm::default();
		form.set_income("$120,000.50");
		assert_eq!(form.income(), "12000050");
	}

	#[test]
	fn completeness_requires_every_field() {
		assert!(!RecordForm::new("", "1", "1").is_complete());
		assert!(!RecordForm::new("Acme", "", "1").is_complete());
		assert!(!RecordForm::new("Acme", "1", "").is_complete());
		assert!(!RecordForm::new("Acme", "abc", "1").is_complete());
		assert!(RecordForm::new("Acme", "1", "1").is_complete());
	}

	#[test]
	fn numbers_use_leading_digits() {
		let form = RecordForm::new("Acme", "120000", " 9500 dollars");
		assert_eq!(form.income_value(), 120_000);
		assert_eq!(form.deduction_value(), 9_500);
		assert_eq!(RecordForm::new("A", "1", "n/a").deduction_value(), 0);
		assert_eq!(RecordForm::new("A", "1", "-5").deduction_value(), 0);
	}

	#[test]
	fn reset_clears_fields() {
		let mut form = RecordForm::new("Acme", "1", "2");
		form.reset();
		assert_eq!(form, RecordForm::default());
	}
}
