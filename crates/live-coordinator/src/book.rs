use crate::prefs::{PreferenceStore, AUTO_FOLLOW_KEY};
use live_scene::{normalize_scene_urls, LiveStatus, Scene, VersePreferences};
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Everything a live surface needs to know, published as one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct LiveState {
	pub scene: Option<Scene>,
	pub status: LiveStatus,
	pub client_count: u64,
	pub auto_follow: bool,
	pub verse_prefs: VersePreferences,
}

impl Default for LiveState {
	fn default() -> Self {
		Self {
			scene: None,
			status: LiveStatus::default(),
			client_count: 0,
			auto_follow: true,
			verse_prefs: VersePreferences::default(),
		}
	}
}

/// The single state cell behind a coordinator.
///
/// There are two ways in: `author_*` for changes made by this client, which
/// always win, and `arbitrate_*` for changes heard from the wire, which only
/// land when their clock is not older than what is held.
#[derive(Debug)]
pub struct LiveBook {
	state: watch::Sender<LiveState>,
	origin: RwLock<Option<String>>,
}

impl LiveBook {
	pub fn new(initial: LiveState, origin: Option<String>) -> Self {
		let (state, _) = watch::channel(initial);
		Self {
			state,
			origin: RwLock::new(origin),
		}
	}

	/// Build a book whose auto-follow flag comes from the preference store
	pub fn restore(prefs: &dyn PreferenceStore, origin: Option<String>) -> Self {
		let auto_follow = match prefs.get_bool(AUTO_FOLLOW_KEY) {
			Ok(stored) => stored.unwrap_or(true),
			Err(e) => {
				warn!("could not read auto-follow preference, using default: {e}");
				true
			}
		};

		Self::new(LiveState { auto_follow, ..LiveState::default() }, origin)
	}

	pub fn origin(&self) -> Option<String> {
		self.origin.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	pub fn set_origin(&self, origin: Option<String>) {
		*self.origin.write().unwrap_or_else(PoisonError::into_inner) = origin;
	}

	fn normalize(&self, scene: Scene) -> Scene {
		match self.origin() {
			Some(origin) => normalize_scene_urls(scene, &origin),
			None => scene,
		}
	}

	pub fn snapshot(&self) -> LiveState {
		self.state.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<LiveState> {
		self.state.subscribe()
	}

	pub fn scene(&self) -> Option<Scene> {
		self.state.borrow().scene.clone()
	}

	pub fn status(&self) -> LiveStatus {
		self.state.borrow().status
	}

	pub fn client_count(&self) -> u64 {
		self.state.borrow().client_count
	}

	pub fn auto_follow(&self) -> bool {
		self.state.borrow().auto_follow
	}

	pub fn verse_prefs(&self) -> VersePreferences {
		self.state.borrow().verse_prefs.clone()
	}

	/// Local write: replaces the scene unconditionally and returns what was stored
	pub fn author_scene(&self, scene: Scene) -> Scene {
		let scene = self.normalize(scene);
		self.state.send_modify(|state| state.scene = Some(scene.clone()));
		scene
	}

	/// Local clear, never rejected
	pub fn author_clear(&self) {
		self.state.send_if_modified(|state| state.scene.take().is_some());
	}

	pub fn author_status(&self, status: LiveStatus) {
		self.state.send_modify(|state| state.status = status);
	}

	/// Remote write under last-writer-wins. `None` always clears.
	///
	/// Returns whether the incoming scene was accepted.
	pub fn arbitrate_scene(&self, incoming: Option<Scene>) -> bool {
		let Some(incoming) = incoming else {
			self.state.send_if_modified(|state| state.scene.take().is_some());
			return true;
		};

		let incoming = self.normalize(incoming);
		let mut accepted = false;
		self.state.send_if_modified(|state| {
			match &state.scene {
				Some(current) if !current.is_superseded_by(&incoming) => {
					debug!(current = current.version, incoming = incoming.version, "ignoring stale scene");
					return false;
				}
				Some(current) if *current == incoming => {
					accepted = true;
					return false;
				}
				_ => {}
			}
			accepted = true;
			state.scene = Some(incoming);
			true
		});
		accepted
	}

	/// Remote status under the same law, on its own clock
	pub fn arbitrate_status(&self, incoming: LiveStatus) -> bool {
		let mut accepted = false;
		self.state.send_if_modified(|state| {
			if !state.status.is_superseded_by(&incoming) {
				debug!(current = state.status.updated_at, incoming = incoming.updated_at, "ignoring stale status");
				return false;
			}
			accepted = true;
			let changed = state.status != incoming;
			state.status = incoming;
			changed
		});
		accepted
	}

	pub fn set_client_count(&self, count: u64) {
		self.state.send_if_modified(|state| {
			let changed = state.client_count != count;
			state.client_count = count;
			changed
		});
	}

	pub fn set_auto_follow(&self, auto_follow: bool) {
		self.state.send_if_modified(|state| {
			let changed = state.auto_follow != auto_follow;
			state.auto_follow = auto_follow;
			changed
		});
	}

	pub fn set_verse_prefs(&self, prefs: VersePreferences) {
		self.state.send_modify(|state| state.verse_prefs = prefs);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::prefs::MemoryPreferences;
	use live_scene::{LiveMode, MediaPayload, SceneContent};

	fn scene(id: &str, version: i64) -> Scene {
		Scene {
			id: id.to_string(),
			version,
			updated_at: version,
			meta: None,
			content: SceneContent::media(MediaPayload::color("#112233")),
		}
	}

	fn book() -> LiveBook {
		LiveBook::new(LiveState::default(), None)
	}

	#[test]
	fn test_newer_scene_wins_in_either_order() {
		let forward = book();
		forward.arbitrate_scene(Some(scene("s1", 900)));
		forward.arbitrate_scene(Some(scene("s1", 1000)));

		let reversed = book();
		reversed.arbitrate_scene(Some(scene("s1", 1000)));
		assert!(!reversed.arbitrate_scene(Some(scene("s1", 900))));

		assert_eq!(forward.scene().unwrap().version, 1000);
		assert_eq!(reversed.scene().unwrap().version, 1000);
	}

	#[test]
	fn test_equal_version_goes_to_incoming() {
		let book = book();
		book.arbitrate_scene(Some(scene("a", 500)));

		assert!(book.arbitrate_scene(Some(scene("b", 500))));

		assert_eq!(book.scene().unwrap().id, "b");
	}

	#[test]
	fn test_clear_ignores_version() {
		let book = book();
		book.arbitrate_scene(Some(scene("s", i64::MAX)));

		assert!(book.arbitrate_scene(None));

		assert!(book.scene().is_none());
	}

	#[test]
	fn test_stored_version_is_max_of_accepted() {
		let book = book();
		for version in [5, 3, 9, 1, 9, 7, 12, 2] {
			book.arbitrate_scene(Some(scene("s", version)));
		}
		assert_eq!(book.scene().unwrap().version, 12);
	}

	#[test]
	fn test_applying_twice_matches_applying_once() {
		let once = book();
		once.arbitrate_scene(Some(scene("s", 10)));

		let twice = book();
		twice.arbitrate_scene(Some(scene("s", 10)));
		twice.arbitrate_scene(Some(scene("s", 10)));

		assert_eq!(once.snapshot(), twice.snapshot());
	}

	#[test]
	fn test_duplicate_does_not_notify() {
		let book = book();
		book.arbitrate_scene(Some(scene("s", 10)));
		let mut rx = book.subscribe();
		rx.borrow_and_update();

		book.arbitrate_scene(Some(scene("s", 10)));

		assert!(!rx.has_changed().unwrap());
	}

	#[test]
	fn test_local_write_bypasses_arbitration() {
		let book = book();
		book.arbitrate_scene(Some(scene("remote", 2000)));

		book.author_scene(scene("local", 1000));

		assert_eq!(book.scene().unwrap().id, "local");
	}

	#[test]
	fn test_status_arbitration() {
		let book = book();
		assert!(book.arbitrate_status(LiveStatus::new(LiveMode::Live, 100)));
		assert!(!book.arbitrate_status(LiveStatus::new(LiveMode::Paused, 99)));
		assert_eq!(book.status().mode, LiveMode::Live);

		assert!(book.arbitrate_status(LiveStatus::new(LiveMode::Paused, 100)));
		assert_eq!(book.status().mode, LiveMode::Paused);
	}

	#[test]
	fn test_incoming_media_is_rehomed_onto_origin() {
		let book = LiveBook::new(LiveState::default(), Some("http://10.0.0.5:3000".to_string()));
		let mut incoming = scene("s", 1);
		incoming.content = SceneContent::media(MediaPayload::image("/uploads/bg.png"));

		book.arbitrate_scene(Some(incoming));

		match book.scene().unwrap().content {
			SceneContent::Media { payload, .. } => assert_eq!(payload.src.as_deref(), Some("http://10.0.0.5:3000/uploads/bg.png")),
			other => panic!("unexpected content {other:?}"),
		}
	}

	#[test]
	fn test_restore_reads_auto_follow() {
		let prefs = MemoryPreferences::default();
		assert!(LiveBook::restore(&prefs, None).auto_follow());

		prefs.set_bool(AUTO_FOLLOW_KEY, false).unwrap();
		assert!(!LiveBook::restore(&prefs, None).auto_follow());
	}
}
