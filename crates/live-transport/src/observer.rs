use crate::{ConnectionState, TransportError};

/// Receives what the transport reads off the wire.
///
/// `on_frame` is called once per physical text frame, in arrival order, on
/// the driver task. Implementations must not block.
pub trait FrameObserver: Send + Sync + 'static {
	fn on_frame(&self, frame: &str);

	fn on_error(&self, error: &TransportError) {
		let _ = error;
	}

	fn on_state(&self, state: &ConnectionState) {
		let _ = state;
	}
}

impl<F> FrameObserver for F
where
	F: Fn(&str) + Send + Sync + 'static,
{
	fn on_frame(&self, frame: &str) {
		self(frame);
	}
}

/// Fire-and-forget outbound side of a live channel
pub trait Outbound: Send + Sync {
	/// Transmit now if open, otherwise queue for the next connection
	fn send_frame(&self, frame: String);

	fn is_connected(&self) -> bool;
}
