use serde::{Deserialize, Serialize};
use std::fmt;

/// Broadcast mode of the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveMode {
	/// Idle: a client is attached but nothing is being broadcast
	#[default]
	Connected,
	/// Display may actively render and play media
	Live,
	/// Display holds its last frame
	Paused,
}

impl fmt::Display for LiveMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Connected => "connected",
			Self::Live => "live",
			Self::Paused => "paused",
		};
		f.write_str(name)
	}
}

/// Current broadcast mode with its own logical clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
	pub mode: LiveMode,
	pub updated_at: i64,
}

impl LiveStatus {
	pub const fn new(mode: LiveMode, updated_at: i64) -> Self {
		Self { mode, updated_at }
	}

	pub const fn is_live(&self) -> bool {
		matches!(self.mode, LiveMode::Live)
	}

	/// Last-writer-wins: an incoming status replaces this one when its clock is not older
	pub const fn is_superseded_by(&self, incoming: &Self) -> bool {
		incoming.updated_at >= self.updated_at
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_status_is_connected_at_zero() {
		let status = LiveStatus::default();
		assert_eq!(status.mode, LiveMode::Connected);
		assert_eq!(status.updated_at, 0);
	}

	#[test]
	fn test_mode_wire_names() {
		let json = serde_json::to_string(&LiveStatus::new(LiveMode::Paused, 42)).unwrap();
		assert_eq!(json, r#"{"mode":"paused","updatedAt":42}"#);
	}

	#[test]
	fn test_equal_clock_supersedes() {
		let current = LiveStatus::new(LiveMode::Live, 100);
		assert!(current.is_superseded_by(&LiveStatus::new(LiveMode::Paused, 100)));
		assert!(!current.is_superseded_by(&LiveStatus::new(LiveMode::Paused, 99)));
	}
}
