use crate::state::{ConnectionState, StateTransition};
use thiserror::Error;

/// Transport-level failures. None of these are fatal: connection failures
/// schedule a retry and malformed frames are dropped.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("Failed to connect to {url}: {reason}")]
	Handshake { url: String, reason: String },

	#[error("WebSocket error: {0}")]
	Socket(String),

	#[error("Malformed frame: {0}")]
	MalformedFrame(String),

	#[error("Failed to encode payload: {0}")]
	Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StateError {
	#[error("Invalid state transition: {from:?} via {transition:?}")]
	InvalidTransition { from: ConnectionState, transition: StateTransition },
}
