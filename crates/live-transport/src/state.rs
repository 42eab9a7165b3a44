use crate::error::StateError;
use std::time::Instant;
use tokio::sync::watch;

/// Physical connection lifecycle: `Idle → Connecting → Open → Closing → Closed`,
/// with `Closed → Connecting` on retry and any state `→ Idle` when parked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
	Idle,
	Connecting { attempt: u32, started_at: Instant },
	Open { connected_at: Instant },
	Closing { started_at: Instant },
	Closed { reason: String, closed_at: Instant },
}

impl ConnectionState {
	pub const fn is_open(&self) -> bool {
		matches!(self, Self::Open { .. })
	}

	pub const fn is_idle(&self) -> bool {
		matches!(self, Self::Idle)
	}

	/// States holding (or building) a physical socket
	pub const fn is_active(&self) -> bool {
		matches!(self, Self::Connecting { .. } | Self::Open { .. } | Self::Closing { .. })
	}

	pub const fn name(&self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Connecting { .. } => "connecting",
			Self::Open { .. } => "open",
			Self::Closing { .. } => "closing",
			Self::Closed { .. } => "closed",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateTransition {
	StartConnecting { attempt: u32 },
	ConnectionEstablished,
	StartClosing,
	ConnectionLost(String),
	Park,
}

/// Owns the connection state and publishes every accepted transition
pub struct ConnectionMachine {
	state: watch::Sender<ConnectionState>,
}

impl ConnectionMachine {
	pub fn new() -> (Self, watch::Receiver<ConnectionState>) {
		let (state, receiver) = watch::channel(ConnectionState::Idle);
		(Self { state }, receiver)
	}

	pub fn current(&self) -> ConnectionState {
		self.state.borrow().clone()
	}

	pub fn apply(&self, transition: StateTransition) -> Result<ConnectionState, StateError> {
		let next = Self::validate(&self.state.borrow(), transition)?;
		self.state.send_replace(next.clone());
		Ok(next)
	}

	fn validate(current: &ConnectionState, transition: StateTransition) -> Result<ConnectionState, StateError> {
		use ConnectionState::{Closed, Closing, Connecting, Idle, Open};
		use StateTransition::{ConnectionEstablished, ConnectionLost, Park, StartClosing, StartConnecting};

		let next = match (current, &transition) {
			(Idle | Closed { .. }, StartConnecting { attempt }) => Connecting {
				attempt: *attempt,
				started_at: Instant::now(),
			},
			(Connecting { .. }, ConnectionEstablished) => Open { connected_at: Instant::now() },
			(Open { .. }, StartClosing) => Closing { started_at: Instant::now() },
			(Connecting { .. } | Open { .. } | Closing { .. }, ConnectionLost(reason)) => Closed {
				reason: reason.clone(),
				closed_at: Instant::now(),
			},
			(_, Park) => Idle,
			_ => {
				return Err(StateError::InvalidTransition {
					from: current.clone(),
					transition,
				})
			}
		};

		Ok(next)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_full_lifecycle() {
		let (machine, rx) = ConnectionMachine::new();
		assert!(rx.borrow().is_idle());

		machine.apply(StateTransition::StartConnecting { attempt: 0 }).unwrap();
		machine.apply(StateTransition::ConnectionEstablished).unwrap();
		assert!(rx.borrow().is_open());

		machine.apply(StateTransition::StartClosing).unwrap();
		let closed = machine.apply(StateTransition::ConnectionLost("bye".to_string())).unwrap();
		assert_eq!(closed.name(), "closed");

		machine.apply(StateTransition::StartConnecting { attempt: 1 }).unwrap();
		machine.apply(StateTransition::Park).unwrap();
		assert!(machine.current().is_idle());
	}

	#[test]
	fn test_cannot_open_without_connecting() {
		let (machine, _rx) = ConnectionMachine::new();

		let result = machine.apply(StateTransition::ConnectionEstablished);

		assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
		assert!(machine.current().is_idle());
	}

	#[test]
	fn test_failed_handshake_closes() {
		let (machine, _rx) = ConnectionMachine::new();
		machine.apply(StateTransition::StartConnecting { attempt: 0 }).unwrap();

		let state = machine.apply(StateTransition::ConnectionLost("refused".to_string())).unwrap();

		match state {
			ConnectionState::Closed { reason, .. } => assert_eq!(reason, "refused"),
			other => panic!("expected closed, got {other:?}"),
		}
	}

	#[test]
	fn test_lost_is_rejected_when_already_closed() {
		let (machine, _rx) = ConnectionMachine::new();
		assert!(machine.apply(StateTransition::ConnectionLost("x".to_string())).is_err());
	}
}
