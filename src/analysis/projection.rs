//! Tax analysis projection.
//!
//! Pure derivation of display metrics from a record and an optional locally cleared
//! income. Nothing here is persisted; callers recompute on every render.

use crate::workflow::TaxRecord;

use serde::Serialize;

/// Income assumed when neither a cleared nor a public figure is available.
pub const INCOME_FALLBACK: u64 = 50_000;
/// Deduction assumed when the record's public figure is zero.
pub const DEDUCTION_FALLBACK: u64 = 10_000;

const UPPER_BRACKET: u64 = 100_000;
const LOWER_BRACKET: u64 = 50_000;

/// Derived tax metrics. Rate fields are percentages; scores are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxAnalysis {
	pub income: u64,
	pub deduction: u64,
	pub taxable_income: u64,
	/// Marginal bracket rate, percent.
	pub tax_rate: f64,
	pub tax_amount: f64,
	/// Tax over income, percent.
	pub effective_rate: f64,
	/// Deduction over income, percent. `None` when income is zero.
	pub deduction_impact: Option<f64>,
	pub compliance_score: f64,
	pub risk_level: f64,
}

/// Compute the analysis for `record`.
///
/// A verified record always uses its stored cleartext. Otherwise the locally cleared
/// income is used, then the record's public figure, then [`INCOME_FALLBACK`]; zero
/// counts as absent at every step. The public figure doubles as the deduction.
pub fn analyze_tax(record: &TaxRecord, decrypted_income: Option<u64>) -> TaxAnalysis {
	let income = if record.is_verified {
		record.decrypted_value.unwrap_or(0)
	} else {
		decrypted_income
			.filter(|v| *v > 0)
			.or(Some(record.public_value1).filter(|v| *v > 0))
			.unwrap_or(INCOME_FALLBACK)
	};
	let deduction = Some(record.public_value1)
		.filter(|v| *v > 0)
		.unwrap_or(DEDUCTION_FALLBACK);

	let taxable_income = income.saturating_sub(deduction);
	let tax_rate = if taxable_income > UPPER_BRACKET {
		0.3
	} else if taxable_income > LOWER_BRACKET {
		0.2
	} else {
		0.1
	};
	let tax_amount = taxable_income as f64 * tax_rate;
	let effective_rate = if income > 0 {
		tax_amount / income as f64
	} else {
		0.0
	};

	// Zero income: the unbounded ratio saturates the score at 100.
	let deduction_impact = (income > 0).then(|| deduction as f64 / income as f64);
	let compliance_score = match deduction_impact {
		Some(impact) => (85.0 + impact * 15.0).min(100.0),
		None => 100.0,
	};
	let risk_level = (100.0 - compliance_score).clamp(10.0, 90.0);

	TaxAnalysis {
		income,
		deduction,
		taxable_income,
		tax_rate: tax_rate * 100.0,
		tax_amount,
		effective_rate: effective_rate * 100.0,
		deduction_impact: deduction_impact.map(|impact| impact * 100.0),
		compliance_score,
		risk_level,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ledger::{Address, BusinessId};

	fn record(deduction: u64, verified: Option<u64>) -> TaxRecord {
		TaxRecord {
			id: 1,
			business_id: BusinessId::new("tax-1"),
			name: "Acme".to_string(),
			timestamp: 0,
			creator: Address([1; 20]),
			public_value1: deduction,
			public_value2: 0,
			is_verified: verified.is_some(),
			decrypted_value: verified,
		}
	}

	fn approx(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-6
	}

	#[test]
	fn upper_bracket() {
		let analysis = analyze_tax(&record(10_000, None), Some(120_000));
		assert_eq!(analysis.taxable_income, 110_000);
		assert!(approx(analysis.tax_rate, 30.0));
		assert!(approx(analysis.tax_amount, 33_000.0));
		assert!(approx(analysis.effective_rate, 27.5));
	}

	#[test]
	fn exactly_fifty_thousand_stays_in_lowest_bracket() {
		let analysis = analyze_tax(&record(10_000, None), Some(60_000));
		assert_eq!(analysis.taxable_income, 50_000);
		assert!(approx(analysis.tax_rate, 10.0));
		assert!(approx(analysis.tax_amount, 5_000.0));
		assert!(approx(analysis.effective_rate, 8.333_333_333));
	}

	#[test]
	fn verified_value_beats_local_value() {
		let analysis = analyze_tax(&record(10_000, Some(80_000)), Some(500_000));
		assert_eq!(analysis.income, 80_000);
		assert!(approx(analysis.tax_rate, 20.0));
	}

	#[test]
	fn fallbacks_apply_when_figures_are_missing() {
		let analysis = analyze_tax(&record(0, None), None);
		assert_eq!(analysis.income, INCOME_FALLBACK);
		assert_eq!(analysis.deduction, DEDUCTION_FALLBACK);

		// Public figure stands in for income when nothing was cleared.
		let analysis = analyze_tax(&record(30_000, None), Some(0));
		assert_eq!(analysis.income, 30_000);
		assert_eq!(analysis.taxable_income, 0);
	}

	#[test]
	fn scores_follow_deduction_impact() {
		let analysis = analyze_tax(&record(10_000, None), Some(100_000));
		assert!(approx(analysis.deduction_impact.unwrap(), 10.0));
		assert!(approx(analysis.compliance_score, 86.5));
		assert!(approx(analysis.risk_level, 13.5));

		let generous = analyze_tax(&record(90_000, None), Some(100_000));
		assert!(approx(generous.compliance_score, 98.5));
		assert!(approx(generous.risk_level, 10.0));
	}

	#[test]
	fn zero_verified_income_is_guarded() {
		let analysis = analyze_tax(&record(10_000, Some(0)), Some(70_000));
		assert_eq!(analysis.income, 0);
		assert_eq!(analysis.deduction_impact, None);
		assert!(approx(analysis.effective_rate, 0.0));
		assert!(approx(analysis.compliance_score, 100.0));
		assert!(approx(analysis.risk_level, 10.0));
	}
}
