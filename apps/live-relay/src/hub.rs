use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender, TrySendError};
use live_scene::LiveMessage;
use serde::Deserialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

pub type Frame = Arc<str>;

#[derive(Deserialize)]
struct Envelope {
	#[serde(rename = "type")]
	kind: String,
}

/// Last frames worth replaying to a client that joins late
#[derive(Debug, Default)]
struct Retained {
	scene: Option<Frame>,
	status: Option<Frame>,
	clients: usize,
}

/// What a newly joined client gets: a live feed plus the frames to replay first
pub struct Membership {
	pub feed: Receiver<Frame>,
	pub replay: Vec<Frame>,
}

/// Fan-out point for every connected socket.
///
/// Frames are relayed verbatim. Only the envelope `type` is inspected, to
/// retain the latest scene and status; versions are never compared here.
pub struct Hub {
	sender: Sender<Frame>,
	// keeps the channel open while nobody is connected
	_idle: InactiveReceiver<Frame>,
	retained: RwLock<Retained>,
}

impl Hub {
	pub fn new(buffer: usize) -> Self {
		let (mut sender, receiver) = broadcast(buffer.max(1));
		sender.set_overflow(true);
		sender.set_await_active(false);

		Self {
			sender,
			_idle: receiver.deactivate(),
			retained: RwLock::new(Retained::default()),
		}
	}

	fn retained(&self) -> std::sync::RwLockWriteGuard<'_, Retained> {
		self.retained.write().unwrap_or_else(PoisonError::into_inner)
	}

	fn send(&self, frame: Frame) {
		match self.sender.try_broadcast(frame) {
			Ok(Some(_evicted)) => debug!("broadcast buffer full, oldest frame evicted"),
			Ok(None) | Err(TrySendError::Inactive(_)) => {}
			Err(e) => warn!("failed to broadcast frame: {e}"),
		}
	}

	fn announce_count(&self, clients: usize) {
		let count = u64::try_from(clients).unwrap_or(u64::MAX);
		match (LiveMessage::ClientCount { count }).encode() {
			Ok(frame) => self.send(frame.into()),
			Err(e) => warn!("failed to encode client count: {e}"),
		}
	}

	/// Register a client. The replay holds the last status then the last
	/// scene; everything published afterwards arrives on the feed.
	pub fn join(&self) -> Membership {
		let mut retained = self.retained();
		let feed = self.sender.new_receiver();
		let replay = [retained.status.clone(), retained.scene.clone()].into_iter().flatten().collect();

		retained.clients += 1;
		debug!(clients = retained.clients, "client joined");
		self.announce_count(retained.clients);

		Membership { feed, replay }
	}

	pub fn leave(&self) {
		let mut retained = self.retained();
		retained.clients = retained.clients.saturating_sub(1);
		debug!(clients = retained.clients, "client left");
		self.announce_count(retained.clients);
	}

	/// Relay a client frame to everyone, the sender included
	pub fn publish(&self, frame: &str) {
		let frame: Frame = frame.into();
		let mut retained = self.retained();

		match serde_json::from_str::<Envelope>(&frame) {
			Ok(envelope) if envelope.kind == "sceneUpdate" => retained.scene = Some(frame.clone()),
			Ok(envelope) if envelope.kind == "liveStatus" => retained.status = Some(frame.clone()),
			Ok(_) => {}
			Err(e) => debug!("relaying frame without a readable envelope: {e}"),
		}

		self.send(frame);
	}

	pub fn clients(&self) -> usize {
		self.retained.read().unwrap_or_else(PoisonError::into_inner).clients
	}
}
