use crate::{book::LiveBook, error::CoordinatorError};
use live_scene::LiveMessage;
use live_transport::{ConnectionState, FrameObserver, TransportError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Called with frames that could not be decoded
pub type ErrorHook = Arc<dyn Fn(&CoordinatorError) + Send + Sync>;

/// Feeds frames read by the transport into the book through the arbitrated path
pub struct IncomingFrames {
	book: Arc<LiveBook>,
	on_error: Option<ErrorHook>,
}

impl IncomingFrames {
	pub fn new(book: Arc<LiveBook>, on_error: Option<ErrorHook>) -> Self {
		Self { book, on_error }
	}

	pub fn apply(&self, message: LiveMessage) {
		match message {
			LiveMessage::SceneUpdate { scene } => {
				let version = scene.as_ref().map(|scene| scene.version);
				let accepted = self.book.arbitrate_scene(scene);
				debug!(?version, accepted, "scene update received");
			}
			LiveMessage::LiveStatus { status } => {
				let accepted = self.book.arbitrate_status(status);
				debug!(mode = %status.mode, accepted, "live status received");
			}
			LiveMessage::ClientCount { count } => self.book.set_client_count(count),
			LiveMessage::Unknown => debug!("ignoring unknown live message"),
		}
	}
}

impl FrameObserver for IncomingFrames {
	fn on_frame(&self, frame: &str) {
		match LiveMessage::decode(frame) {
			Ok(message) => self.apply(message),
			Err(e) => {
				warn!("dropping malformed live frame: {e}");
				if let Some(hook) = &self.on_error {
					hook(&CoordinatorError::MalformedFrame(e));
				}
			}
		}
	}

	fn on_error(&self, error: &TransportError) {
		debug!("transport error: {error}");
	}

	fn on_state(&self, state: &ConnectionState) {
		debug!(state = state.name(), "live connection state changed");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::book::LiveState;
	use live_scene::LiveMode;
	use std::sync::Mutex;

	fn frames() -> (IncomingFrames, Arc<LiveBook>) {
		let book = Arc::new(LiveBook::new(LiveState::default(), None));
		(IncomingFrames::new(book.clone(), None), book)
	}

	const SCENE_1000: &str =
		r##"{"type":"sceneUpdate","scene":{"id":"s1","type":"media","version":1000,"updatedAt":1000,"payload":{"kind":"color","color":"#000000"}}}"##;
	const SCENE_900: &str =
		r##"{"type":"sceneUpdate","scene":{"id":"s1","type":"media","version":900,"updatedAt":900,"payload":{"kind":"color","color":"#ffffff"}}}"##;

	#[test]
	fn test_delayed_stale_frame_loses() {
		let (frames, book) = frames();

		frames.on_frame(SCENE_1000);
		frames.on_frame(SCENE_900);

		assert_eq!(book.scene().unwrap().version, 1000);
	}

	#[test]
	fn test_null_scene_clears() {
		let (frames, book) = frames();
		frames.on_frame(SCENE_1000);

		frames.on_frame(r#"{"type":"sceneUpdate","scene":null}"#);

		assert!(book.scene().is_none());
	}

	#[test]
	fn test_status_and_count() {
		let (frames, book) = frames();

		frames.on_frame(r#"{"type":"liveStatus","status":{"mode":"live","updatedAt":50}}"#);
		frames.on_frame(r#"{"type":"liveStatus","status":{"mode":"paused","updatedAt":40}}"#);
		frames.on_frame(r#"{"type":"clientCount","count":3}"#);

		assert_eq!(book.status().mode, LiveMode::Live);
		assert_eq!(book.client_count(), 3);

		frames.on_frame(r#"{"type":"clientCount","count":"many"}"#);
		assert_eq!(book.client_count(), 0);
	}

	#[test]
	fn test_unknown_type_is_ignored() {
		let (frames, book) = frames();
		let before = book.snapshot();

		frames.on_frame(r#"{"type":"cursorMoved","x":1}"#);

		assert_eq!(book.snapshot(), before);
	}

	#[test]
	fn test_malformed_frame_reaches_hook() {
		let book = Arc::new(LiveBook::new(LiveState::default(), None));
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		let hook: ErrorHook = Arc::new(move |e| sink.lock().unwrap().push(e.to_string()));
		let frames = IncomingFrames::new(book.clone(), Some(hook));

		frames.on_frame("{not json");
		frames.on_frame(SCENE_1000);

		assert_eq!(seen.lock().unwrap().len(), 1);
		assert_eq!(book.scene().unwrap().version, 1000);
	}
}
