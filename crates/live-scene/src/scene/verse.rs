use super::media::MediaFit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersePayload {
	pub reference: String,
	pub text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub translation: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub background: Option<VerseBackground>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub layout: Option<VerseLayout>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub show_text: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub show_reference: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub media_state: Option<VerseMediaState>,
}

impl VersePayload {
	pub fn new(reference: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			reference: reference.into(),
			text: text.into(),
			translation: None,
			background: None,
			layout: None,
			show_text: None,
			show_reference: None,
			media_state: None,
		}
	}

	/// Apply the operator's session preferences to a bare verse
	#[must_use]
	pub fn with_preferences(mut self, prefs: &VersePreferences) -> Self {
		self.background = Some(prefs.background.clone());
		self.layout = Some(prefs.layout);
		self.show_text = Some(prefs.show_text);
		self.show_reference = Some(prefs.show_reference);
		self.media_state = Some(prefs.media_state.clone());
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerseLayout {
	#[default]
	Overlay,
	Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
	Left,
	#[default]
	Center,
	Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
	Color,
	Image,
	Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseBackground {
	pub kind: BackgroundKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fit: Option<MediaFit>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub overlay_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub overlay_opacity: Option<f64>,
}

impl VerseBackground {
	/// Image and video backgrounds point at an asset URL
	pub const fn has_asset(&self) -> bool {
		matches!(self.kind, BackgroundKind::Image | BackgroundKind::Video)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseMediaState {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_playing: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub current_time: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub muted: Option<bool>,
	#[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
	pub looped: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseStyles {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub font_family: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub font_size: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub line_height: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub align: Option<TextAlign>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub background_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference_size: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_width: Option<f64>,
}

/// Operator defaults applied to every verse pushed from search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersePreferences {
	pub styles: VerseStyles,
	pub background: VerseBackground,
	pub layout: VerseLayout,
	pub show_text: bool,
	pub show_reference: bool,
	pub media_state: VerseMediaState,
}

impl Default for VersePreferences {
	fn default() -> Self {
		Self {
			styles: VerseStyles {
				font_family: Some("Inter".to_string()),
				font_size: Some(40.0),
				line_height: Some(1.2),
				text_color: Some("#ffffff".to_string()),
				align: Some(TextAlign::Center),
				background_color: Some("#000000".to_string()),
				reference_size: Some(15.0),
				reference_color: Some("#ffffff".to_string()),
				max_width: None,
			},
			background: VerseBackground {
				kind: BackgroundKind::Color,
				color: Some("#000000".to_string()),
				src: None,
				fit: Some(MediaFit::Contain),
				overlay_color: Some("#000000".to_string()),
				overlay_opacity: Some(0.4),
			},
			layout: VerseLayout::Overlay,
			show_text: true,
			show_reference: true,
			media_state: VerseMediaState {
				is_playing: Some(true),
				current_time: Some(0.0),
				muted: Some(true),
				looped: Some(true),
			},
		}
	}
}
