use live_coordinator::{IncomingFrames, LiveBook, LiveCoordinator, LiveState, ManualClock, MemoryPreferences, PreferenceStore, SceneInput, SendOptions, AUTO_FOLLOW_KEY};
use live_scene::{LiveMessage, LiveMode, MediaPayload, Scene, SceneContent, SceneMeta, SourceModule, VersePayload, VersePreferences};
use live_transport::Outbound;
use std::sync::{Arc, Mutex};

// ============================================================================
// Harness
// ============================================================================

/// Captures frames instead of sending them
#[derive(Default)]
struct RecordingOutbound {
	frames: Mutex<Vec<String>>,
}

impl RecordingOutbound {
	fn messages(&self) -> Vec<LiveMessage> {
		self.frames.lock().unwrap().iter().map(|frame| LiveMessage::decode(frame).unwrap()).collect()
	}

	fn types(&self) -> Vec<&'static str> {
		self.messages().iter().map(LiveMessage::type_name).collect()
	}
}

impl Outbound for RecordingOutbound {
	fn send_frame(&self, frame: String) {
		self.frames.lock().unwrap().push(frame);
	}

	fn is_connected(&self) -> bool {
		false
	}
}

struct Harness {
	coordinator: LiveCoordinator,
	incoming: IncomingFrames,
	outbound: Arc<RecordingOutbound>,
	clock: Arc<ManualClock>,
	prefs: Arc<MemoryPreferences>,
}

fn harness() -> Harness {
	harness_with_origin(None)
}

fn harness_with_origin(origin: Option<&str>) -> Harness {
	let outbound = Arc::new(RecordingOutbound::default());
	let clock = Arc::new(ManualClock::new(1_000));
	let prefs = Arc::new(MemoryPreferences::default());
	let book = Arc::new(LiveBook::new(LiveState::default(), origin.map(str::to_string)));
	let incoming = IncomingFrames::new(book.clone(), None);
	let coordinator = LiveCoordinator::new(book, outbound.clone(), clock.clone(), prefs.clone());
	Harness {
		coordinator,
		incoming,
		outbound,
		clock,
		prefs,
	}
}

fn black_media() -> SceneInput {
	SceneInput::new(SceneContent::media(MediaPayload::color("#000000")))
}

// ============================================================================
// Local operations
// ============================================================================

#[test]
fn test_send_scene_applies_before_any_echo() {
	let h = harness();

	let sent = h.coordinator.send_scene(black_media(), SendOptions::default());

	assert_eq!(h.coordinator.scene(), Some(sent.clone()));
	assert_eq!(sent.version, 1_000);
	assert_eq!(sent.updated_at, 1_000);
	assert!(sent.id.starts_with("scene-1000-"));
	assert_eq!(h.outbound.types(), vec!["sceneUpdate"]);
}

#[test]
fn test_send_scene_keeps_supplied_identity() {
	let h = harness();

	let sent = h.coordinator.send_scene(black_media().with_id("s1").with_version(42), SendOptions::default());

	assert_eq!(sent.id, "s1");
	assert_eq!(sent.version, 42);
}

#[test]
fn test_force_live_sends_scene_then_status() {
	let h = harness();

	h.coordinator.send_scene(black_media(), SendOptions::live());

	let messages = h.outbound.messages();
	assert_eq!(messages.len(), 2);
	assert!(matches!(messages[0], LiveMessage::SceneUpdate { scene: Some(_) }));
	match &messages[1] {
		LiveMessage::LiveStatus { status } => assert_eq!(status.mode, LiveMode::Live),
		other => panic!("expected liveStatus, got {other:?}"),
	}
	assert!(h.coordinator.status().is_live());
}

#[test]
fn test_force_live_when_already_live_sends_only_scene() {
	let h = harness();
	h.coordinator.set_live_mode(LiveMode::Live);

	h.coordinator.send_scene(black_media(), SendOptions::live());

	assert_eq!(h.outbound.types(), vec!["liveStatus", "sceneUpdate"]);
}

#[test]
fn test_clear_scene_transmits_null() {
	let h = harness();
	h.coordinator.send_scene(black_media(), SendOptions::default());

	h.coordinator.clear_scene();

	assert!(h.coordinator.scene().is_none());
	assert_eq!(h.outbound.messages().last(), Some(&LiveMessage::SceneUpdate { scene: None }));
}

#[test]
fn test_resend_bumps_clock_and_keeps_id() {
	let h = harness();
	let original = h.coordinator.send_scene(black_media(), SendOptions::default());
	h.clock.advance(500);

	let resent = h.coordinator.resend_scene().unwrap();

	assert_eq!(resent.id, original.id);
	assert_eq!(resent.version, 1_500);
	assert_eq!(resent.updated_at, 1_500);
	assert_eq!(h.outbound.types(), vec!["sceneUpdate", "sceneUpdate"]);
}

#[test]
fn test_resend_without_scene_is_noop() {
	let h = harness();

	assert!(h.coordinator.resend_scene().is_none());
	assert!(h.outbound.messages().is_empty());
}

#[test]
fn test_send_black_goes_live() {
	let h = harness();

	let scene = h.coordinator.send_black();

	assert_eq!(scene.content, SceneContent::black());
	assert_eq!(scene.meta, Some(SceneMeta::titled("Black", SourceModule::System)));
	assert_eq!(h.coordinator.status().mode, LiveMode::Live);
	assert_eq!(h.outbound.types(), vec!["sceneUpdate", "liveStatus"]);
}

#[test]
fn test_live_mode_is_stamped_with_clock() {
	let h = harness();
	h.clock.set(7_777);

	let status = h.coordinator.set_live_mode(LiveMode::Paused);

	assert_eq!(status.updated_at, 7_777);
	assert_eq!(h.coordinator.status(), status);
}

#[test]
fn test_local_scene_overrides_newer_remote() {
	let h = harness();
	let remote = Scene {
		id: "remote".to_string(),
		version: 9_000,
		updated_at: 9_000,
		meta: None,
		content: SceneContent::black(),
	};
	h.incoming.apply(LiveMessage::SceneUpdate { scene: Some(remote.clone()) });
	assert_eq!(h.coordinator.scene(), Some(remote));

	let local = h.coordinator.send_scene(black_media().with_version(10), SendOptions::default());

	assert_eq!(h.coordinator.scene(), Some(local));
}

#[test]
fn test_auto_follow_persists() {
	let h = harness();
	assert!(h.coordinator.auto_follow());

	h.coordinator.set_auto_follow(false).unwrap();

	assert!(!h.coordinator.auto_follow());
	assert_eq!(h.prefs.get_bool(AUTO_FOLLOW_KEY).unwrap(), Some(false));
	assert!(h.outbound.messages().is_empty());
}

#[test]
fn test_verse_prefs_are_session_state() {
	let h = harness();
	let mut prefs = VersePreferences::default();
	prefs.show_reference = false;

	h.coordinator.set_verse_prefs(prefs.clone());

	assert_eq!(h.coordinator.verse_prefs(), prefs);
	let verse = VersePayload::new("John 3:16", "For God so loved the world").with_preferences(&h.coordinator.verse_prefs());
	assert_eq!(verse.show_reference, Some(false));
}

#[test]
fn test_relative_media_is_rehomed_before_storing() {
	let h = harness_with_origin(Some("http://192.168.1.20:3000"));

	let sent = h.coordinator.send_scene(SceneInput::new(SceneContent::media(MediaPayload::video("uploads/loop.mp4"))), SendOptions::default());

	match sent.content {
		SceneContent::Media { payload, .. } => assert_eq!(payload.src.as_deref(), Some("http://192.168.1.20:3000/uploads/loop.mp4")),
		other => panic!("unexpected content {other:?}"),
	}
}

#[tokio::test]
async fn test_subscribers_see_local_changes() {
	let h = harness();
	let mut rx = h.coordinator.subscribe();

	h.coordinator.send_scene(black_media(), SendOptions::live());

	rx.changed().await.unwrap();
	let state = rx.borrow_and_update().clone();
	assert!(state.scene.is_some());
	assert!(state.status.is_live());
}
