use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
	#[error("Malformed live message: {0}")]
	Decode(#[from] serde_json::Error),
}
