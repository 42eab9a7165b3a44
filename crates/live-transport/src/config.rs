use crate::retry::Backoff;
use std::time::Duration;

pub const DEFAULT_QUEUE_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct TransportConfig {
	/// Frames kept while disconnected; oldest are dropped beyond this
	pub max_queue_size: usize,
	pub backoff: Backoff,
	/// Ping period while open
	pub keepalive_interval: Duration,
	/// A connection with no inbound activity for this long is considered dead
	pub idle_timeout: Duration,
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			max_queue_size: DEFAULT_QUEUE_LIMIT,
			backoff: Backoff::default(),
			keepalive_interval: Duration::from_secs(30),
			idle_timeout: Duration::from_secs(120),
		}
	}
}

impl TransportConfig {
	/// Settings used by the live scene channel
	pub fn live_sync() -> Self {
		Self {
			max_queue_size: 10,
			backoff: Backoff::Exponential {
				initial: Duration::from_millis(1200),
				ceiling: Duration::from_secs(12),
			},
			..Self::default()
		}
	}

	#[must_use]
	pub const fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
		self.max_queue_size = max_queue_size;
		self
	}

	#[must_use]
	pub fn with_backoff(mut self, backoff: Backoff) -> Self {
		self.backoff = backoff;
		self
	}

	#[must_use]
	pub const fn with_keepalive(mut self, keepalive_interval: Duration, idle_timeout: Duration) -> Self {
		self.keepalive_interval = keepalive_interval;
		self.idle_timeout = idle_timeout;
		self
	}
}
