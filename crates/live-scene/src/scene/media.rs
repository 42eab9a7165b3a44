use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
	Image,
	Video,
	Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFit {
	Cover,
	Contain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
	pub kind: MediaKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fit: Option<MediaFit>,
	#[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
	pub looped: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub muted: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_playing: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_time: Option<f64>,
}

impl MediaPayload {
	pub fn color(color: impl Into<String>) -> Self {
		Self {
			kind: MediaKind::Color,
			src: None,
			color: Some(color.into()),
			fit: None,
			looped: None,
			muted: None,
			is_playing: None,
			current_time: None,
		}
	}

	pub fn image(src: impl Into<String>) -> Self {
		Self {
			kind: MediaKind::Image,
			src: Some(src.into()),
			fit: Some(MediaFit::Contain),
			..Self::color_less()
		}
	}

	pub fn video(src: impl Into<String>) -> Self {
		Self {
			kind: MediaKind::Video,
			src: Some(src.into()),
			fit: Some(MediaFit::Contain),
			looped: Some(true),
			muted: Some(true),
			is_playing: Some(true),
			current_time: Some(0.0),
			..Self::color_less()
		}
	}

	const fn color_less() -> Self {
		Self {
			kind: MediaKind::Color,
			src: None,
			color: None,
			fit: None,
			looped: None,
			muted: None,
			is_playing: None,
			current_time: None,
		}
	}

	pub const fn is_playable(&self) -> bool {
		matches!(self.kind, MediaKind::Video)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStyles {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub background_color: Option<String>,
}
