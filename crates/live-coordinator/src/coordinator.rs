use crate::{
	book::{LiveBook, LiveState},
	clock::Clock,
	prefs::{PreferenceStore, AUTO_FOLLOW_KEY},
	Result,
};
use live_scene::{LiveMessage, LiveMode, LiveStatus, Scene, SceneContent, SceneMeta, SourceModule, VersePreferences};
use live_transport::Outbound;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// A scene as authored by an editor, before the coordinator stamps it
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInput {
	pub id: Option<String>,
	pub version: Option<i64>,
	pub updated_at: Option<i64>,
	pub meta: Option<SceneMeta>,
	pub content: SceneContent,
}

impl SceneInput {
	pub const fn new(content: SceneContent) -> Self {
		Self {
			id: None,
			version: None,
			updated_at: None,
			meta: None,
			content,
		}
	}

	#[must_use]
	pub fn with_meta(mut self, meta: SceneMeta) -> Self {
		self.meta = Some(meta);
		self
	}

	/// Keep an existing broadcast identity, e.g. for in-place edits
	#[must_use]
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	#[must_use]
	pub const fn with_version(mut self, version: i64) -> Self {
		self.version = Some(version);
		self.updated_at = Some(version);
		self
	}
}

impl From<SceneContent> for SceneInput {
	fn from(content: SceneContent) -> Self {
		Self::new(content)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
	/// Switch to live mode after sending, unless already live
	pub force_live: bool,
}

impl SendOptions {
	pub const fn live() -> Self {
		Self { force_live: true }
	}
}

fn new_scene_id(now: i64) -> String {
	let suffix = uuid::Uuid::new_v4().simple().to_string();
	format!("scene-{now}-{}", &suffix[..12])
}

/// Imperative face of the live state.
///
/// Every local operation updates the book first and then transmits, so the
/// caller observes its own change before any round-trip. Cheap to clone.
#[derive(Clone)]
pub struct LiveCoordinator {
	book: Arc<LiveBook>,
	outbound: Arc<dyn Outbound>,
	clock: Arc<dyn Clock>,
	prefs: Arc<dyn PreferenceStore>,
}

impl LiveCoordinator {
	pub fn new(book: Arc<LiveBook>, outbound: Arc<dyn Outbound>, clock: Arc<dyn Clock>, prefs: Arc<dyn PreferenceStore>) -> Self {
		Self { book, outbound, clock, prefs }
	}

	fn transmit(&self, message: &LiveMessage) {
		match message.encode() {
			Ok(frame) => self.outbound.send_frame(frame),
			Err(e) => error!(kind = message.type_name(), "failed to encode live message: {e}"),
		}
	}

	/// Stamp, store and broadcast a scene. Returns the scene as stored.
	pub fn send_scene(&self, input: impl Into<SceneInput>, options: SendOptions) -> Scene {
		let input = input.into();
		let now = self.clock.now_millis();
		let scene = Scene {
			id: input.id.unwrap_or_else(|| new_scene_id(now)),
			version: input.version.unwrap_or(now),
			updated_at: input.updated_at.unwrap_or(now),
			meta: input.meta,
			content: input.content,
		};

		let stored = self.book.author_scene(scene);
		info!(id = %stored.id, kind = %stored.kind(), version = stored.version, "sending scene");
		self.transmit(&LiveMessage::scene_update(Some(stored.clone())));

		if options.force_live && !self.book.status().is_live() {
			self.set_live_mode(LiveMode::Live);
		}

		stored
	}

	pub fn clear_scene(&self) {
		self.book.author_clear();
		info!("clearing scene");
		self.transmit(&LiveMessage::scene_update(None));
	}

	/// Re-broadcast the current scene with a fresh clock. No-op without a scene.
	pub fn resend_scene(&self) -> Option<Scene> {
		let Some(current) = self.book.scene() else {
			debug!("nothing to resend");
			return None;
		};

		let bumped = current.restamped(self.clock.now_millis());
		let stored = self.book.author_scene(bumped);
		info!(id = %stored.id, version = stored.version, "resending scene");
		self.transmit(&LiveMessage::scene_update(Some(stored.clone())));
		Some(stored)
	}

	/// Cut to a solid black frame and go live
	pub fn send_black(&self) -> Scene {
		let input = SceneInput::new(SceneContent::black()).with_meta(SceneMeta::titled("Black", SourceModule::System));
		self.send_scene(input, SendOptions::live())
	}

	pub fn set_live_mode(&self, mode: LiveMode) -> LiveStatus {
		let status = LiveStatus::new(mode, self.clock.now_millis());
		self.book.author_status(status);
		info!(%mode, "live mode changed");
		self.transmit(&LiveMessage::live_status(status));
		status
	}

	/// Update the flag in memory and persist it. The in-memory flag changes
	/// even when persisting fails.
	pub fn set_auto_follow(&self, auto_follow: bool) -> Result<()> {
		self.book.set_auto_follow(auto_follow);
		self.prefs.set_bool(AUTO_FOLLOW_KEY, auto_follow)?;
		Ok(())
	}

	pub fn set_verse_prefs(&self, prefs: VersePreferences) {
		self.book.set_verse_prefs(prefs);
	}

	pub fn scene(&self) -> Option<Scene> {
		self.book.scene()
	}

	pub fn status(&self) -> LiveStatus {
		self.book.status()
	}

	pub fn client_count(&self) -> u64 {
		self.book.client_count()
	}

	pub fn auto_follow(&self) -> bool {
		self.book.auto_follow()
	}

	pub fn verse_prefs(&self) -> VersePreferences {
		self.book.verse_prefs()
	}

	pub fn is_connected(&self) -> bool {
		self.outbound.is_connected()
	}

	pub fn snapshot(&self) -> LiveState {
		self.book.snapshot()
	}

	pub fn subscribe(&self) -> watch::Receiver<LiveState> {
		self.book.subscribe()
	}

	pub(crate) fn set_origin(&self, origin: Option<String>) {
		self.book.set_origin(origin);
	}
}
