//! Reconnecting WebSocket channel.
//!
//! [`LiveTransport`] keeps a single physical connection to a target URL,
//! delivers each inbound text frame to a [`FrameObserver`], and never loses
//! the newest outbound frames: anything sent while disconnected waits in a
//! bounded queue and is flushed in order on the next open.

mod config;
mod driver;
mod error;
mod observer;
mod queue;
mod retry;
mod state;

pub use config::{TransportConfig, DEFAULT_QUEUE_LIMIT};
pub use error::{StateError, TransportError};
pub use observer::{FrameObserver, Outbound};
pub use queue::OutboundQueue;
pub use retry::{Backoff, DelayFn, RetryPolicy};
pub use state::{ConnectionMachine, ConnectionState, StateTransition};

use driver::{Command, Driver};
use serde::Serialize;
use std::sync::Arc;
use tokio::{
	sync::{mpsc, watch, Mutex},
	task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, TransportError>;

/// Handle to a running transport driver.
///
/// Dropping the handle stops the driver; call [`LiveTransport::shutdown`] to
/// also wait for the socket to close.
pub struct LiveTransport {
	commands: mpsc::UnboundedSender<Command>,
	state: watch::Receiver<ConnectionState>,
	cancel: CancellationToken,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl LiveTransport {
	/// Spawn the driver on the current runtime. With `target == None` the
	/// transport starts parked and only queues.
	pub fn connect(target: Option<String>, config: TransportConfig, observer: Arc<dyn FrameObserver>) -> Self {
		let (commands, receiver) = mpsc::unbounded_channel();
		let (machine, state) = ConnectionMachine::new();
		let cancel = CancellationToken::new();

		let driver = Driver::new(target, config, receiver, machine, observer, cancel.clone());
		let task = tokio::spawn(driver.run());

		Self {
			commands,
			state,
			cancel,
			task: Mutex::new(Some(task)),
		}
	}

	/// Send now if open, otherwise queue. Never blocks and never fails.
	pub fn send(&self, frame: impl Into<String>) {
		if self.commands.send(Command::Send(frame.into())).is_err() {
			warn!("transport driver is gone, frame discarded");
		}
	}

	/// Serialize and send. The only error is a payload that cannot be encoded.
	pub fn send_json<T: Serialize>(&self, payload: &T) -> Result<()> {
		let frame = serde_json::to_string(payload)?;
		self.send(frame);
		Ok(())
	}

	/// Switch to a different URL (or park with `None`). The current socket is
	/// closed, the retry counter resets and queued frames are kept.
	pub fn set_target(&self, target: Option<String>) {
		if self.commands.send(Command::Retarget(target)).is_err() {
			warn!("transport driver is gone, retarget ignored");
		}
	}

	pub fn state(&self) -> ConnectionState {
		self.state.borrow().clone()
	}

	pub fn is_connected(&self) -> bool {
		self.state.borrow().is_open()
	}

	pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
		self.state.clone()
	}

	/// Stop reconnecting, close the socket and wait for the driver to finish
	pub async fn shutdown(&self) {
		self.cancel.cancel();
		let task = self.task.lock().await.take();
		if let Some(task) = task {
			if let Err(e) = task.await {
				warn!("transport driver ended abnormally: {e}");
			}
		}
		debug!("live transport shut down");
	}
}

impl Drop for LiveTransport {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

impl Outbound for LiveTransport {
	fn send_frame(&self, frame: String) {
		self.send(frame);
	}

	fn is_connected(&self) -> bool {
		Self::is_connected(self)
	}
}
