//! Shared vocabulary for live presentation sync.
//!
//! A [`Scene`] is "what is on screen now", a [`LiveStatus`] is the broadcast
//! mode, and [`LiveMessage`] is the JSON envelope that carries either of them
//! (plus the relay's client count) over the wire.

mod error;
mod message;
pub mod scene;
mod status;
pub mod urls;

pub use error::SceneError;
pub use message::LiveMessage;
pub use scene::{
	cover::{CoverBackground, CoverCanvas, CoverDocument, CoverLayer, CoverPayload},
	lyrics::{LyricsPayload, LyricsStyles},
	media::{MediaFit, MediaKind, MediaPayload, MediaStyles},
	verse::{BackgroundKind, TextAlign, VerseBackground, VerseLayout, VerseMediaState, VersePayload, VersePreferences, VerseStyles},
	Scene, SceneContent, SceneKind, SceneMeta, SourceModule,
};
pub use status::{LiveMode, LiveStatus};
pub use urls::{ensure_absolute_url, normalize_scene_urls, strip_backend_origin, API_PATH_PREFIX};
