//! Record lifecycle orchestrator.
//!
//! This module defines the `RecordOrchestrator`, which coordinates the wallet connection,
//! the encryption service and the ledger contract into the create / list / decrypt
//! workflow the dashboard exposes.
//!
//! The orchestrator is responsible for:
//! - Initializing the encryption service once per wallet connection
//! - Loading the record list, tolerating individual record failures
//! - Encrypting and submitting new records
//! - Running the decrypt / verify round and republishing the verified state
//!
//! Every action catches its own failure and projects it into the status notifier, so
//! nothing escapes as a panic and a failed action can simply be triggered again.
//! Published state (records, operation tokens, status) is exposed through `watch`
//! channels for the presentation layer.

use crate::config::DashboardConfig;
use crate::fhe::{DecryptionSubmitter, EncryptionService, FheError};
use crate::ledger::{
	Address, BusinessId, LedgerContract, LedgerError, LedgerSigner, TxHash,
};
use crate::workflow::{
	form::RecordForm,
	operations::{OperationBoard, OperationKind, OperationState},
	records::{RecordReveal, TaxRecord, coerce_number},
	status::StatusNotifier,
	types::{WalletConnection, WorkflowError},
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

const MSG_CONNECT_WALLET: &str = "Please connect wallet first";
const MSG_INITIALIZING: &str = "Initializing FHE encryption...";
const MSG_INITIALIZED: &str = "FHE encryption ready";
const MSG_INIT_FAILED: &str = "FHE initialization failed. Please check your wallet connection.";
const MSG_LOAD_FAILED: &str = "Failed to load data";
const MSG_CREATING: &str = "Creating tax record with FHE encryption...";
const MSG_AWAITING_CONFIRMATION: &str = "Waiting for transaction confirmation...";
const MSG_CREATED: &str = "Tax record created successfully!";
const MSG_REJECTED: &str = "Transaction rejected by user";
const MSG_DECRYPTING: &str = "Decrypting data with FHE...";
const MSG_STORED_VERIFIED: &str = "Data already verified on-chain";
const MSG_VERIFYING: &str = "Verifying decryption on-chain...";
const MSG_VERIFIED: &str = "Data decrypted and verified successfully!";
const MSG_RACE_VERIFIED: &str = "Data is already verified on-chain";

/// How a decrypt / verify round ended when it succeeded.
enum DecryptOutcome {
	/// The contract already held a verified value; no decryption ran.
	AlreadyVerified(u64),
	/// This round cleared and verified the value.
	Verified(u64),
}

/// Main coordinator for the record lifecycle.
pub struct RecordOrchestrator {
	config: DashboardConfig,
	configured_contract: Option<Address>,
	ledger: Arc<dyn LedgerContract>,
	fhe: Arc<dyn EncryptionService>,

	connection: watch::Sender<WalletConnection>,
	discovered_contract: watch::Sender<Option<Address>>,
	records: watch::Sender<Vec<TaxRecord>>,
	operations: watch::Sender<OperationBoard>,
	status: StatusNotifier,
	/// Millisecond stamp of the last generated business identifier.
	last_id_millis: AtomicU64,
}

impl RecordOrchestrator {
	pub fn new(
		config: DashboardConfig,
		ledger: Arc<dyn LedgerContract>,
		fhe: Arc<dyn EncryptionService>,
	) -> Result<Self, WorkflowError> {
		let configured_contract = config.contract_address()?;
		let status = StatusNotifier::new(config.success_display(), config.error_display());

		Ok(Self {
			config,
			configured_contract,
			ledger,
			fhe,
			connection: watch::channel(WalletConnection::Disconnected).0,
			discovered_contract: watch::channel(None).0,
			records: watch::channel(Vec::new()).0,
			operations: watch::channel(OperationBoard::default()).0,
			status,
			last_id_millis: AtomicU64::new(0),
		})
	}

	pub fn connection(&self) -> WalletConnection {
		*self.connection.borrow()
	}

	/// Snapshot of the last published record list.
	pub fn records(&self) -> Vec<TaxRecord> {
		self.records.borrow().clone()
	}

	pub fn subscribe_records(&self) -> watch::Receiver<Vec<TaxRecord>> {
		self.records.subscribe()
	}

	pub fn operations(&self) -> OperationBoard {
		*self.operations.borrow()
	}

	pub fn subscribe_operations(&self) -> watch::Receiver<OperationBoard> {
		self.operations.subscribe()
	}

	pub fn status(&self) -> &StatusNotifier {
		&self.status
	}

	/// Contract ciphertexts are bound to: the configured one, else the discovered one.
	pub fn contract_address(&self) -> Option<Address> {
		self.configured_contract.or(*self.discovered_contract.borrow())
	}

	/// Whether the create form may be submitted right now.
	pub fn can_submit(&self, form: &RecordForm) -> bool {
		form.is_complete()
			&& !self.operations().is_in_flight(OperationKind::Create)
			&& !self.fhe.is_encrypting()
	}

	/// React to a wallet connection change.
	///
	/// On connect this initializes the encryption service, loads the record list and
	/// discovers the contract address. Loading runs even if initialization failed, so
	/// the dashboard stays readable.
	pub async fn on_wallet_changed(&self, connection: WalletConnection) {
		let previous = self.connection.send_replace(connection);

		match connection {
			WalletConnection::Connected { account } => {
				if previous != connection {
					info!("Wallet connected: {}", account);
				}
				self.ensure_initialized().await;
				self.load_records().await;
				self.discover_contract_address().await;
			}
			WalletConnection::Disconnected => {
				if previous.is_connected() {
					info!("Wallet disconnected");
				}
				// Re-arm initialization for the next connection.
				self.operations.send_if_modified(|board| {
					if board.get(OperationKind::Initialize).is_in_flight() {
						return false;
					}
					board.set(OperationKind::Initialize, OperationState::Idle);
					true
				});
			}
		}
	}

	/// Initialize the encryption service unless it is ready or already starting.
	///
	/// Returns whether the service is initialized afterwards. A failure leaves the
	/// service uninitialized so the next trigger tries again.
	pub async fn ensure_initialized(&self) -> bool {
		if !self.connection().is_connected() {
			return false;
		}
		if self.fhe.is_initialized() {
			return true;
		}
		if !self.begin(OperationKind::Initialize) {
			debug!("Encryption service initialization already in flight");
			return false;
		}

		info!("Initializing encryption service after wallet connection");
		self.status.pending(MSG_INITIALIZING);
		match self.fhe.initialize().await {
			Ok(()) => {
				info!("Encryption service initialized");
				self.status.success(MSG_INITIALIZED);
				self.settle(OperationKind::Initialize, true);
				true
			}
			Err(e) => {
				error!("Failed to initialize encryption service: {}", e);
				self.status.error(MSG_INIT_FAILED);
				self.settle(OperationKind::Initialize, false);
				false
			}
		}
	}

	/// Reload every record from the contract and publish the list.
	///
	/// Records that fail to load are logged and left out. Returns `None` when the wallet
	/// is disconnected or the identifiers could not be enumerated.
	pub async fn load_records(&self) -> Option<Vec<TaxRecord>> {
		if !self.connection().is_connected() {
			return None;
		}

		self.enter(OperationKind::Refresh);
		let result = self.fetch_records().await;
		self.settle(OperationKind::Refresh, result.is_ok());

		match result {
			Ok(records) => {
				self.records.send_replace(records.clone());
				Some(records)
			}
			Err(e) => {
				error!("Failed to load records: {}", e);
				self.status.error(MSG_LOAD_FAILED);
				None
			}
		}
	}

	async fn fetch_records(&self) -> Result<Vec<TaxRecord>, WorkflowError> {
		let ids = self.ledger.get_all_business_ids().await?;
		let total = ids.len();
		let now_millis = chrono::Utc::now().timestamp_millis().max(0) as u64;

		let mut records = Vec::with_capacity(total);
		for id in ids {
			match self.ledger.get_business_data(&id).await {
				Ok(data) => records.push(TaxRecord::from_business_data(
					id,
					data,
					&self.config.business_id_prefix,
					now_millis,
				)),
				Err(e) => {
					error!("Error loading business data for {}: {}", id, e);
				}
			}
		}

		info!("Loaded {} of {} records", records.len(), total);
		Ok(records)
	}

	async fn discover_contract_address(&self) {
		match self.ledger.address().await {
			Ok(address) => {
				self.discovered_contract.send_replace(Some(address));
			}
			Err(e) => warn!("Failed to read contract address: {}", e),
		}
	}

	async fn binding_address(&self) -> Result<Address, WorkflowError> {
		if let Some(address) = self.contract_address() {
			return Ok(address);
		}
		let address = self.ledger.address().await?;
		self.discovered_contract.send_replace(Some(address));
		Ok(address)
	}

	/// Encrypt the form's income and submit it as a new record.
	///
	/// On success the record list is reloaded and the form is reset. A second call
	/// while one is in flight, or while the service is encrypting, is refused.
	pub async fn create_record(&self, form: &mut RecordForm) -> Result<BusinessId, WorkflowError> {
		let Some(account) = self.connection().account() else {
			self.status.error(MSG_CONNECT_WALLET);
			return Err(WorkflowError::WalletNotConnected);
		};
		if !form.is_complete() {
			return Err(WorkflowError::IncompleteForm);
		}
		if self.fhe.is_encrypting() || !self.begin(OperationKind::Create) {
			return Err(WorkflowError::Busy(OperationKind::Create));
		}

		self.status.pending(MSG_CREATING);
		let result = self.submit_record(account, form).await;

		match &result {
			Ok(id) => {
				info!("Created tax record {}", id);
				self.status.success(MSG_CREATED);
				self.load_records().await;
				form.reset();
			}
			Err(e) => {
				error!("Failed to create tax record: {}", e);
				let message = if e.is_user_rejection() {
					MSG_REJECTED.to_string()
				} else {
					format!("Submission failed: {}", e)
				};
				self.status.error(message);
			}
		}

		self.settle(OperationKind::Create, result.is_ok());
		result
	}

	async fn submit_record(
		&self,
		account: Address,
		form: &RecordForm,
	) -> Result<BusinessId, WorkflowError> {
		let signer = self.ledger.with_signer(&account).await?;
		let contract = self.binding_address().await?;
		let id = self.next_business_id();

		let encrypted = self
			.fhe
			.encrypt(&contract, &account, form.income_value())
			.await?;
		debug!("Encrypted income for {}", id);

		let tx = signer
			.create_business_data(
				&id,
				form.name(),
				&encrypted.encrypted_data,
				&encrypted.proof,
				form.deduction_value(),
				0,
				&self.config.record_label,
			)
			.await?;

		self.status.pending(MSG_AWAITING_CONFIRMATION);
		let receipt = self.ledger.wait_for_receipt(&tx).await?;
		debug!(
			"Record {} confirmed in block {} by {}",
			id, receipt.block_number, receipt.tx_hash
		);
		Ok(id)
	}

	/// Business identifier stamped with the current time in milliseconds, bumped past
	/// the previous one when two are generated within the same millisecond.
	fn next_business_id(&self) -> BusinessId {
		let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
		let previous = self
			.last_id_millis
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
				Some(now.max(last + 1))
			})
			.unwrap_or(now);
		let stamp = now.max(previous + 1);
		BusinessId::new(format!("{}{}", self.config.business_id_prefix, stamp))
	}

	/// Reveal and verify the encrypted income of `id`.
	///
	/// Returns the cleartext on success. An already verified record returns its stored
	/// value without any decryption work. When the contract reports that another
	/// verification won the race, the list is reloaded and `None` is returned.
	///
	/// Invocations are not serialized: the `Decrypt` token is a coarse busy flag that
	/// every invocation sets on start and settles on completion.
	pub async fn decrypt_and_verify(&self, id: &BusinessId) -> Option<u64> {
		let Some(account) = self.connection().account() else {
			self.status.error(MSG_CONNECT_WALLET);
			return None;
		};

		self.enter(OperationKind::Decrypt);
		self.status.pending(MSG_DECRYPTING);
		let (value, ok) = match self.reveal_and_verify(id, account).await {
			Ok(DecryptOutcome::AlreadyVerified(value)) => {
				info!("Record {} already verified on-chain", id);
				self.status.success(MSG_STORED_VERIFIED);
				(Some(value), true)
			}
			Ok(DecryptOutcome::Verified(value)) => {
				info!("Record {} decrypted and verified", id);
				self.status.success(MSG_VERIFIED);
				(Some(value), true)
			}
			Err(e) if e.is_already_verified() => {
				warn!("Record {} was verified concurrently: {}", id, e);
				self.status.success(MSG_RACE_VERIFIED);
				self.load_records().await;
				(None, true)
			}
			Err(e) => {
				error!("Failed to decrypt record {}: {}", id, e);
				self.status.error(format!("Decryption failed: {}", e));
				(None, false)
			}
		};

		self.settle(OperationKind::Decrypt, ok);
		value
	}

	async fn reveal_and_verify(
		&self,
		id: &BusinessId,
		account: Address,
	) -> Result<DecryptOutcome, WorkflowError> {
		let data = self.ledger.get_business_data(id).await?;
		if data.is_verified {
			return Ok(DecryptOutcome::AlreadyVerified(coerce_number(
				&data.decrypted_value,
			)));
		}

		let signer = self.ledger.with_signer(&account).await?;
		let handle = self.ledger.get_encrypted_value(id).await?;
		let contract = self.binding_address().await?;

		let submitter = VerificationSubmitter {
			signer,
			business_id: id.clone(),
			submitted: OnceLock::new(),
		};
		let result = self
			.fhe
			.verify_decryption(&[handle], &contract, &submitter)
			.await?;

		self.status.pending(MSG_VERIFYING);
		let tx = submitter
			.submitted
			.get()
			.copied()
			.ok_or(WorkflowError::NoVerificationSubmitted)?;
		let receipt = self.ledger.wait_for_receipt(&tx).await?;
		debug!("Verification of {} confirmed in block {}", id, receipt.block_number);

		let clear = result
			.value_of(&handle)
			.ok_or(FheError::UnknownHandle(handle))?;

		self.load_records().await;
		Ok(DecryptOutcome::Verified(clear))
	}

	/// Toggle the income reveal of an opened record.
	///
	/// Hides a shown local value without any service call; otherwise runs
	/// [`RecordOrchestrator::decrypt_and_verify`] and shows its result.
	pub async fn toggle_reveal(&self, reveal: &mut RecordReveal) -> Option<u64> {
		if reveal.local_income().is_some() {
			reveal.hide();
			return None;
		}

		let id = reveal.business_id.clone();
		let value = self.decrypt_and_verify(&id).await;
		if let Some(income) = value {
			reveal.show(income);
		}
		value
	}

	fn begin(&self, kind: OperationKind) -> bool {
		let mut started = false;
		self.operations.send_if_modified(|board| {
			started = board.try_begin(kind);
			started
		});
		started
	}

	fn enter(&self, kind: OperationKind) {
		self.operations
			.send_modify(|board| board.set(kind, OperationState::InFlight));
	}

	fn settle(&self, kind: OperationKind, ok: bool) {
		self.operations
			.send_modify(|board| board.set(kind, OperationState::settled(ok)));
	}
}

/// Submits a cleared value through the signer-bound contract handle and remembers
/// the resulting transaction.
struct VerificationSubmitter {
	signer: Arc<dyn LedgerSigner>,
	business_id: BusinessId,
	submitted: OnceLock<TxHash>,
}

#[async_trait::async_trait]
impl DecryptionSubmitter for VerificationSubmitter {
	async fn submit(
		&self,
		clear_values_encoded: &[u8],
		proof: &[u8],
	) -> Result<TxHash, LedgerError> {
		let tx = self
			.signer
			.verify_decryption(&self.business_id, clear_values_encoded, proof)
			.await?;
		let _ = self.submitted.set(tx);
		Ok(tx)
	}
}
