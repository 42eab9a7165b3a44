use crate::{LiveStatus, Scene, SceneError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Wire envelope exchanged over the live channel as JSON text frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LiveMessage {
	/// `scene: null` clears the display
	SceneUpdate {
		#[serde(default)]
		scene: Option<Scene>,
	},
	LiveStatus {
		status: LiveStatus,
	},
	/// Relay-generated connection count
	ClientCount {
		#[serde(default, deserialize_with = "lenient_count")]
		count: u64,
	},
	/// Any `type` this client does not understand; ignored on receipt
	#[serde(other)]
	Unknown,
}

impl LiveMessage {
	pub fn decode(frame: &str) -> Result<Self, SceneError> {
		Ok(serde_json::from_str(frame)?)
	}

	pub fn encode(&self) -> Result<String, SceneError> {
		Ok(serde_json::to_string(self)?)
	}

	pub const fn scene_update(scene: Option<Scene>) -> Self {
		Self::SceneUpdate { scene }
	}

	pub const fn live_status(status: LiveStatus) -> Self {
		Self::LiveStatus { status }
	}

	/// Wire name of the envelope, as used by the relay for snapshotting
	pub const fn type_name(&self) -> &'static str {
		match self {
			Self::SceneUpdate { .. } => "sceneUpdate",
			Self::LiveStatus { .. } => "liveStatus",
			Self::ClientCount { .. } => "clientCount",
			Self::Unknown => "unknown",
		}
	}
}

// Non-numeric counts normalize to zero instead of failing the whole frame.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Value::deserialize(deserializer)?;
	let count = match value {
		Value::Number(number) => number.as_u64().or_else(|| number.as_f64().filter(|n| n.is_finite() && *n > 0.0).map(|n| n.trunc() as u64)).unwrap_or(0),
		_ => 0,
	};
	Ok(count)
}
