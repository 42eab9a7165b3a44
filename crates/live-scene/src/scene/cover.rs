//! Sermon cover documents.
//!
//! The layer editor owns the full shape of a cover; the sync core only needs
//! to find asset URLs inside it. Everything except the `type` and `src` keys
//! is kept in flattened maps so unknown fields survive a round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverPayload {
	pub doc: CoverDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverDocument {
	pub canvas: CoverCanvas,
	#[serde(default)]
	pub layers: Vec<CoverLayer>,
}

impl CoverDocument {
	pub fn image_layers(&self) -> impl Iterator<Item = &CoverLayer> {
		self.layers.iter().filter(|layer| layer.is_image())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverCanvas {
	pub background: CoverBackground,
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

/// `solid`, `gradient` or `image`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverBackground {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src: Option<String>,
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

impl CoverBackground {
	pub fn is_image(&self) -> bool {
		self.kind == "image"
	}
}

/// `text`, `image`, `shape`, `badge` or `icon`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLayer {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src: Option<String>,
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

impl CoverLayer {
	pub fn is_image(&self) -> bool {
		self.kind == "image"
	}
}
