//! Operation state tokens.
//!
//! Each kind of user-visible asynchronous action has one state token. Tokens drive the
//! presentation layer's busy indicators and, for initialization and record creation,
//! reject a second start while the first is in flight.

use std::fmt;

/// Kinds of asynchronous actions the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
	Initialize,
	Refresh,
	Create,
	Decrypt,
}

impl fmt::Display for OperationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			OperationKind::Initialize => "initialize",
			OperationKind::Refresh => "refresh",
			OperationKind::Create => "create",
			OperationKind::Decrypt => "decrypt",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
	#[default]
	Idle,
	InFlight,
	Succeeded,
	Failed,
}

impl OperationState {
	pub fn is_in_flight(&self) -> bool {
		matches!(self, OperationState::InFlight)
	}

	pub(crate) fn settled(ok: bool) -> Self {
		if ok {
			OperationState::Succeeded
		} else {
			OperationState::Failed
		}
	}
}

/// One state token per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationBoard {
	initialize: OperationState,
	refresh: OperationState,
	create: OperationState,
	decrypt: OperationState,
}

impl OperationBoard {
	pub fn get(&self, kind: OperationKind) -> OperationState {
		match kind {
			OperationKind::Initialize => self.initialize,
			OperationKind::Refresh => self.refresh,
			OperationKind::Create => self.create,
			OperationKind::Decrypt => self.decrypt,
		}
	}

	pub fn set(&mut self, kind: OperationKind, state: OperationState) {
		let slot = match kind {
			OperationKind::Initialize => &mut self.initialize,
			OperationKind::Refresh => &mut self.refresh,
			OperationKind::Create => &mut self.create,
			OperationKind::Decrypt => &mut self.decrypt,
		};
		*slot = state;
	}

	pub fn is_in_flight(&self, kind: OperationKind) -> bool {
		self.get(kind).is_in_flight()
	}

	/// Move `kind` to `InFlight` unless it already is. Returns whether it moved.
	pub fn try_begin(&mut self, kind: OperationKind) -> bool {
		if self.is_in_flight(kind) {
			return false;
		}
		self.set(kind, OperationState::InFlight);
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn try_begin_refuses_second_start() {
		let mut board = OperationBoard::default();
		assert!(board.try_begin(OperationKind::Create));
		assert!(!board.try_begin(OperationKind::Create));
		assert!(board.try_begin(OperationKind::Decrypt));

		board.set(OperationKind::Create, OperationState::settled(false));
		assert_eq!(board.get(OperationKind::Create), OperationState::Failed);
		assert!(board.try_begin(OperationKind::Create));
	}
}
