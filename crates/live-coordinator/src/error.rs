use live_scene::SceneError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
	#[error("Malformed live frame: {0}")]
	MalformedFrame(#[from] SceneError),

	#[error("Preference error: {0}")]
	Preference(#[from] PreferenceError),
}

#[derive(Debug, Error)]
pub enum PreferenceError {
	#[error("Failed to access preference file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Preference file is not a JSON object: {0}")]
	Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
	#[error("Invalid backend origin {origin}: {reason}")]
	InvalidOrigin { origin: String, reason: String },

	#[error("Backend at {origin} is unavailable: {reason}")]
	Unavailable { origin: String, reason: String },
}
