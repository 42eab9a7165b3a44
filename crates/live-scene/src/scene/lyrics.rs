use super::verse::TextAlign;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsPayload {
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub segment_title: Option<String>,
	pub content: String,
}

impl LyricsPayload {
	pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			segment_title: None,
			content: content.into(),
		}
	}

	#[must_use]
	pub fn with_segment(mut self, segment_title: impl Into<String>) -> Self {
		self.segment_title = Some(segment_title.into());
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsStyles {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub font_family: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub font_size: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub background_color: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub align: Option<TextAlign>,
}
