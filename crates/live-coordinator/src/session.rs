use crate::{
	book::LiveBook,
	clock::{Clock, SystemClock},
	coordinator::LiveCoordinator,
	discovery::BackendInfo,
	incoming::{ErrorHook, IncomingFrames},
	prefs::{MemoryPreferences, PreferenceStore},
};
use live_scene::Scene;
use live_transport::{ConnectionState, LiveTransport, TransportConfig};
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, time::timeout};
use tracing::info;

pub struct SessionOptions {
	pub transport: TransportConfig,
	pub prefs: Arc<dyn PreferenceStore>,
	pub clock: Arc<dyn Clock>,
	pub on_error: Option<ErrorHook>,
}

impl Default for SessionOptions {
	fn default() -> Self {
		Self {
			transport: TransportConfig::live_sync(),
			prefs: Arc::new(MemoryPreferences::default()),
			clock: Arc::new(SystemClock),
			on_error: None,
		}
	}
}

impl SessionOptions {
	#[must_use]
	pub fn with_prefs(mut self, prefs: Arc<dyn PreferenceStore>) -> Self {
		self.prefs = prefs;
		self
	}

	#[must_use]
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	#[must_use]
	pub fn with_transport(mut self, transport: TransportConfig) -> Self {
		self.transport = transport;
		self
	}

	#[must_use]
	pub fn with_error_hook(mut self, on_error: ErrorHook) -> Self {
		self.on_error = Some(on_error);
		self
	}
}

/// One live lifecycle: built at startup, shut down once at exit.
///
/// Without backend info the session starts parked and queues local
/// operations until [`LiveSession::retarget`] supplies one.
pub struct LiveSession {
	transport: Arc<LiveTransport>,
	coordinator: LiveCoordinator,
}

impl LiveSession {
	/// Must be called from within a tokio runtime
	pub fn start(info: Option<BackendInfo>, options: SessionOptions) -> Self {
		let origin = info.as_ref().map(|info| info.origin.clone());
		let target = info.map(|info| info.ws_url);
		let book = Arc::new(LiveBook::restore(options.prefs.as_ref(), origin));

		let incoming = Arc::new(IncomingFrames::new(book.clone(), options.on_error));
		let transport = Arc::new(LiveTransport::connect(target.clone(), options.transport, incoming));
		let coordinator = LiveCoordinator::new(book, transport.clone(), options.clock, options.prefs);

		info!(target = ?target, "live session started");
		Self { transport, coordinator }
	}

	pub const fn coordinator(&self) -> &LiveCoordinator {
		&self.coordinator
	}

	/// Point the session at a newly resolved backend, or park it with `None`
	pub fn retarget(&self, info: Option<BackendInfo>) {
		let origin = info.as_ref().map(|info| info.origin.clone());
		self.coordinator.set_origin(origin);
		self.transport.set_target(info.map(|info| info.ws_url));
	}

	pub fn is_connected(&self) -> bool {
		self.transport.is_connected()
	}

	pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
		self.transport.watch_state()
	}

	/// Wait up to `limit` for the connection to open
	pub async fn wait_connected(&self, limit: Duration) -> bool {
		let mut connection = self.transport.watch_state();
		let opened = timeout(limit, connection.wait_for(ConnectionState::is_open)).await;
		opened.is_ok_and(|state| state.is_ok())
	}

	/// Wait up to `limit` for a scene to be held, whether authored here or
	/// replayed by the backend after connecting. The backend's replay is read
	/// after the connection reports open, so a fresh session starts empty.
	pub async fn wait_for_scene(&self, limit: Duration) -> Option<Scene> {
		let mut state = self.coordinator.subscribe();
		let held = timeout(limit, async { state.wait_for(|state| state.scene.is_some()).await.ok().and_then(|state| state.scene.clone()) }).await;
		held.ok().flatten()
	}

	pub async fn shutdown(&self) {
		self.transport.shutdown().await;
		info!("live session stopped");
	}
}
