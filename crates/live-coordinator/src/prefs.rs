use crate::error::PreferenceError;
use serde_json::{Map, Value};
use std::{
	collections::HashMap,
	fs, io,
	path::{Path, PathBuf},
	sync::{Mutex, PoisonError},
};

/// Key under which the auto-follow toggle is persisted
pub const AUTO_FOLLOW_KEY: &str = "live:autoFollow";

/// Small durable key/value port for operator preferences
pub trait PreferenceStore: Send + Sync {
	fn get_bool(&self, key: &str) -> Result<Option<bool>, PreferenceError>;

	fn set_bool(&self, key: &str, value: bool) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
	values: Mutex<HashMap<String, bool>>,
}

impl PreferenceStore for MemoryPreferences {
	fn get_bool(&self, key: &str) -> Result<Option<bool>, PreferenceError> {
		let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
		Ok(values.get(key).copied())
	}

	fn set_bool(&self, key: &str, value: bool) -> Result<(), PreferenceError> {
		self.values.lock().unwrap_or_else(PoisonError::into_inner).insert(key.to_string(), value);
		Ok(())
	}
}

/// Preferences kept as one JSON object on disk.
///
/// Writes go to a sibling temp file which is then renamed over the original,
/// so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct JsonFilePreferences {
	path: PathBuf,
	lock: Mutex<()>,
}

impl JsonFilePreferences {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn io_error(&self, source: io::Error) -> PreferenceError {
		PreferenceError::Io {
			path: self.path.clone(),
			source,
		}
	}

	fn load(&self) -> Result<Map<String, Value>, PreferenceError> {
		match fs::read_to_string(&self.path) {
			Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
			Ok(contents) => Ok(serde_json::from_str(&contents)?),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
			Err(e) => Err(self.io_error(e)),
		}
	}

	fn store(&self, values: &Map<String, Value>) -> Result<(), PreferenceError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
		}

		let tmp = self.path.with_extension("tmp");
		let contents = serde_json::to_string_pretty(values)?;
		fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
		fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
	}
}

impl PreferenceStore for JsonFilePreferences {
	fn get_bool(&self, key: &str) -> Result<Option<bool>, PreferenceError> {
		let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
		Ok(self.load()?.get(key).and_then(Value::as_bool))
	}

	fn set_bool(&self, key: &str, value: bool) -> Result<(), PreferenceError> {
		let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
		let mut values = self.load()?;
		values.insert(key.to_string(), Value::Bool(value));
		self.store(&values)
	}
}
