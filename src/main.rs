mod analysis;
mod config;
mod fhe;
mod ledger;
mod sim;
mod utils;
mod workflow;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::analysis::{DashboardStats, analyze_tax, filter_records};
use crate::config::DashboardConfig;
use crate::ledger::Address;
use crate::sim::{InMemoryLedger, KeyGateway, SimulatedFhe};
use crate::utils::{format_percent, short_address};
use crate::workflow::{RecordForm, RecordOrchestrator, RecordReveal, WalletConnection};

/// Address the simulated contract is deployed at when none is configured.
const DEMO_CONTRACT: Address = Address([0x5a; 20]);
/// Account the simulated wallet connects with.
const DEMO_ACCOUNT: Address = Address([0x11; 20]);
/// Round trip of every simulated encryption service call.
const DEMO_SERVICE_LATENCY: Duration = Duration::from_millis(200);

#[tokio::main(flavor = "current_thread")]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	let config = match std::env::args().nth(1) {
		Some(path) => match DashboardConfig::from_file(Path::new(&path)) {
			Ok(config) => config,
			Err(e) => {
				error!("Failed to load configuration from {}: {}", path, e);
				return;
			}
		},
		None => DashboardConfig::default(),
	};

	info!("Starting tax record dashboard");

	let contract = config
		.contract_address()
		.ok()
		.flatten()
		.unwrap_or(DEMO_CONTRACT);
	let gateway = Arc::new(KeyGateway::new());
	let ledger = Arc::new(InMemoryLedger::new(contract, gateway.clone()));
	let fhe = Arc::new(SimulatedFhe::new(gateway).with_latency(DEMO_SERVICE_LATENCY));

	info!("Created simulated ledger at {}", contract);

	let orchestrator = match RecordOrchestrator::new(config, ledger.clone(), fhe) {
		Ok(orchestrator) => orchestrator,
		Err(e) => {
			error!("Failed to start record orchestrator: {}", e);
			return;
		}
	};

	let mut status_rx = orchestrator.status().subscribe();
	tokio::spawn(async move {
		while status_rx.changed().await.is_ok() {
			let status = status_rx.borrow_and_update().clone();
			match status {
				Some(status) => match status.expires_at {
					Some(at) => info!(
						"[{:?}] {} (clears in {:?})",
						status.kind,
						status.message,
						at.saturating_duration_since(tokio::time::Instant::now())
					),
					None => info!("[{:?}] {}", status.kind, status.message),
				},
				None => debug!("Status cleared"),
			}
		}
	});

	let mut operations_rx = orchestrator.subscribe_operations();
	tokio::spawn(async move {
		while operations_rx.changed().await.is_ok() {
			debug!("Operations: {:?}", *operations_rx.borrow_and_update());
		}
	});

	let mut records_rx = orchestrator.subscribe_records();
	tokio::spawn(async move {
		while records_rx.changed().await.is_ok() {
			let count = records_rx.borrow_and_update().len();
			info!("Dashboard lists {} record(s)", count);
		}
	});

	orchestrator
		.on_wallet_changed(WalletConnection::Connected {
			account: DEMO_ACCOUNT,
		})
		.await;

	for (name, income, deduction) in [
		("Acme Holdings", "120000", "10000"),
		("Globex Corporation", "60000", "10000"),
	] {
		let mut form = RecordForm::new(name, income, deduction);
		if !orchestrator.can_submit(&form) {
			warn!("Skipping record {}: form cannot be submitted", name);
			continue;
		}
		debug!(
			"Submitting {} with income {} and deduction {}",
			form.name(),
			form.income(),
			form.deduction()
		);
		match orchestrator.create_record(&mut form).await {
			Ok(id) => info!(
				"Created record {} for {} labelled {:?}",
				id,
				name,
				ledger.label_of(&id).unwrap_or_default()
			),
			Err(e) => error!("Failed to create record for {}: {}", name, e),
		}
	}

	let records = orchestrator.records();
	let mut reveals: Vec<RecordReveal> = records
		.iter()
		.map(|record| RecordReveal::new(record.business_id.clone()))
		.collect();

	// Reveal the first record only; the rest are analysed from public figures.
	if let Some(reveal) = reveals.first_mut() {
		orchestrator.toggle_reveal(reveal).await;
	}

	for (record, reveal) in orchestrator.records().iter().zip(&reveals) {
		let analysis = analyze_tax(record, reveal.local_income());
		let deduction_impact = analysis
			.deduction_impact
			.map(format_percent)
			.unwrap_or_else(|| "n/a".to_string());
		info!(
			"#{} {} by {}: shown income {:?}, analysed income {}, deduction {} ({})",
			record.id,
			record.name,
			short_address(&record.creator),
			reveal.income_of(record),
			analysis.income,
			analysis.deduction,
			deduction_impact,
		);
		info!(
			"#{} taxable {}, rate {}, tax {:.2}, effective {}, compliance {:.1}, risk {:.1}",
			record.id,
			analysis.taxable_income,
			format_percent(analysis.tax_rate),
			analysis.tax_amount,
			format_percent(analysis.effective_rate),
			analysis.compliance_score,
			analysis.risk_level,
		);
	}

	let now = chrono::Utc::now().timestamp().max(0) as u64;
	let stats = DashboardStats::from_records(&orchestrator.records(), now);
	info!(
		"{} records, {} verified ({}%), {} this week, average income {}, average deduction {:.2}",
		stats.total_records,
		stats.verified_records,
		stats.verification_rate,
		stats.recent_records,
		stats.average_income,
		stats.average_deduction,
	);

	let records = orchestrator.records();
	let matches = filter_records(&records, "acme");
	info!("{} record(s) match \"acme\"", matches.len());

	if let Some(status) = orchestrator.status().current() {
		info!("Last status: {:?} {}", status.kind, status.message);
	}

	orchestrator
		.on_wallet_changed(WalletConnection::Disconnected)
		.await;
}
