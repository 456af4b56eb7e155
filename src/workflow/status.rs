//! Transaction status notifications.
//!
//! A single status slot is published through a `watch` channel. Success and error
//! statuses carry an expiry and are cleared by a scheduled task; publishing a newer
//! status aborts the pending clear, and each clear only removes the status it was
//! scheduled for, so a late timer never wipes a newer message.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
	Pending,
	Success,
	Error,
}

/// A visible status message with an optional expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
	pub kind: StatusKind,
	pub message: String,
	/// Publication order, unique per notifier.
	pub sequence: u64,
	/// When the status is cleared; `None` for pending statuses.
	pub expires_at: Option<Instant>,
}

/// Publishes transaction statuses and clears them after their display duration.
pub struct StatusNotifier {
	slot: Arc<watch::Sender<Option<TransactionStatus>>>,
	sequence: AtomicU64,
	pending_clear: Mutex<Option<JoinHandle<()>>>,
	success_display: Duration,
	error_display: Duration,
}

impl StatusNotifier {
	pub fn new(success_display: Duration, error_display: Duration) -> Self {
		let (slot, _) = watch::channel(None);
		Self {
			slot: Arc::new(slot),
			sequence: AtomicU64::new(0),
			pending_clear: Mutex::new(None),
			success_display,
			error_display,
		}
	}

	/// Show a pending status until it is replaced.
	pub fn pending(&self, message: impl Into<String>) {
		self.publish(StatusKind::Pending, message.into(), None);
	}

	pub fn success(&self, message: impl Into<String>) {
		self.publish(StatusKind::Success, message.into(), Some(self.success_display));
	}

	pub fn error(&self, message: impl Into<String>) {
		self.publish(StatusKind::Error, message.into(), Some(self.error_display));
	}

	/// Currently visible status, if any.
	pub fn current(&self) -> Option<TransactionStatus> {
		self.slot.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<Option<TransactionStatus>> {
		self.slot.subscribe()
	}

	fn publish(&self, kind: StatusKind, message: String, display: Option<Duration>) {
		let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
		let expires_at = display.map(|d| Instant::now() + d);
		debug!("Status #{} {:?}: {}", sequence, kind, message);

		let mut pending_clear = self
			.pending_clear
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		if let Some(stale) = pending_clear.take() {
			stale.abort();
		}

		self.slot.send_replace(Some(TransactionStatus {
			kind,
			message,
			sequence,
			expires_at,
		}));

		if let Some(deadline) = expires_at {
			let slot = self.slot.clone();
			*pending_clear = Some(tokio::spawn(async move {
				tokio::time::sleep_until(deadline).await;
				slot.send_if_modified(|current| {
					let ours = current.as_ref().map(|s| s.sequence) == Some(sequence);
					if ours {
						*current = None;
					}
					ours
				});
			}));
		}
	}
}

impl Drop for StatusNotifier {
	fn drop(&mut self) {
		if let Some(handle) = self
			.pending_clear
			.get_mut()
			.unwrap_or_else(PoisonError::into_inner)
			.take()
		{
			handle.abort();
		}
	}
}
