use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub mod cover;
pub mod lyrics;
pub mod media;
pub mod verse;

use cover::CoverPayload;
use lyrics::{LyricsPayload, LyricsStyles};
use media::{MediaPayload, MediaStyles};
use verse::{VersePayload, VerseStyles};

/// What is on screen now.
///
/// `id` identifies one broadcast instance and only changes when a brand-new
/// scene is pushed. `version` is a millisecond timestamp used as the logical
/// clock for arbitration; `updated_at` is informational and set alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
	pub id: String,
	pub version: i64,
	pub updated_at: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<SceneMeta>,
	#[serde(flatten)]
	pub content: SceneContent,
}

impl Scene {
	pub const fn kind(&self) -> SceneKind {
		self.content.kind()
	}

	/// Last-writer-wins with ties going to the incoming scene
	pub const fn is_superseded_by(&self, incoming: &Self) -> bool {
		incoming.version >= self.version
	}

	/// Same scene instance re-stamped with a fresh clock
	#[must_use]
	pub fn restamped(mut self, now: i64) -> Self {
		self.version = now;
		self.updated_at = now;
		self
	}

	pub fn title(&self) -> Option<&str> {
		self.meta.as_ref().and_then(|meta| meta.title.as_deref())
	}
}

/// Type-specific payload and style overrides, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SceneContent {
	Verse {
		payload: VersePayload,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		styles: Option<VerseStyles>,
	},
	Lyrics {
		payload: LyricsPayload,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		styles: Option<LyricsStyles>,
	},
	Cover {
		payload: CoverPayload,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		styles: Option<Map<String, Value>>,
	},
	Media {
		payload: MediaPayload,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		styles: Option<MediaStyles>,
	},
}

impl SceneContent {
	pub const fn kind(&self) -> SceneKind {
		match self {
			Self::Verse { .. } => SceneKind::Verse,
			Self::Lyrics { .. } => SceneKind::Lyrics,
			Self::Cover { .. } => SceneKind::Cover,
			Self::Media { .. } => SceneKind::Media,
		}
	}

	pub const fn verse(payload: VersePayload) -> Self {
		Self::Verse { payload, styles: None }
	}

	pub const fn lyrics(payload: LyricsPayload) -> Self {
		Self::Lyrics { payload, styles: None }
	}

	pub const fn media(payload: MediaPayload) -> Self {
		Self::Media { payload, styles: None }
	}

	/// Solid black frame used for "cut to black"
	pub fn black() -> Self {
		Self::Media {
			payload: MediaPayload::color("#000000"),
			styles: Some(MediaStyles {
				background_color: Some("#000000".to_string()),
			}),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneKind {
	Verse,
	Lyrics,
	Cover,
	Media,
}

impl fmt::Display for SceneKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Verse => "verse",
			Self::Lyrics => "lyrics",
			Self::Cover => "cover",
			Self::Media => "media",
		};
		f.write_str(name)
	}
}

/// Human-readable labeling for UI; never used for logic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMeta {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtitle: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_module: Option<SourceModule>,
}

impl SceneMeta {
	pub fn titled(title: impl Into<String>, source_module: SourceModule) -> Self {
		Self {
			title: Some(title.into()),
			subtitle: None,
			source_module: Some(source_module),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceModule {
	Search,
	Lyrics,
	Covers,
	Media,
	System,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_decode_lyrics_scene() {
		let value = json!({
			"id": "scene-1",
			"type": "lyrics",
			"version": 1000,
			"updatedAt": 1000,
			"payload": { "title": "Amazing Grace", "segmentTitle": "Verse 1", "content": "Amazing grace\nhow sweet the sound" },
			"meta": { "title": "Amazing Grace", "sourceModule": "lyrics" }
		});

		let scene: Scene = serde_json::from_value(value).unwrap();

		assert_eq!(scene.id, "scene-1");
		assert_eq!(scene.kind(), SceneKind::Lyrics);
		assert_eq!(scene.title(), Some("Amazing Grace"));
		match scene.content {
			SceneContent::Lyrics { payload, styles } => {
				assert_eq!(payload.segment_title.as_deref(), Some("Verse 1"));
				assert!(styles.is_none());
			}
			other => panic!("expected lyrics, got {other:?}"),
		}
	}

	#[test]
	fn test_encode_puts_type_at_top_level() {
		let scene = Scene {
			id: "s1".to_string(),
			version: 5,
			updated_at: 5,
			meta: None,
			content: SceneContent::black(),
		};

		let value = serde_json::to_value(&scene).unwrap();

		assert_eq!(value["type"], "media");
		assert_eq!(value["payload"]["kind"], "color");
		assert_eq!(value["payload"]["color"], "#000000");
		assert_eq!(value["styles"]["backgroundColor"], "#000000");
		assert!(value.get("meta").is_none());
	}

	#[test]
	fn test_unknown_scene_type_is_rejected() {
		let value = json!({ "id": "x", "type": "hologram", "version": 1, "updatedAt": 1, "payload": {} });
		assert!(serde_json::from_value::<Scene>(value).is_err());
	}

	#[test]
	fn test_restamp_keeps_identity() {
		let scene = Scene {
			id: "s1".to_string(),
			version: 5,
			updated_at: 5,
			meta: None,
			content: SceneContent::black(),
		};

		let bumped = scene.clone().restamped(99);

		assert_eq!(bumped.id, scene.id);
		assert_eq!(bumped.version, 99);
		assert_eq!(bumped.updated_at, 99);
		assert!(scene.is_superseded_by(&bumped));
		assert!(!bumped.is_superseded_by(&scene));
	}
}
