use std::sync::atomic::{AtomicI64, Ordering};

/// Millisecond wall clock used to stamp scene versions and status changes
pub trait Clock: Send + Sync {
	fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> i64 {
		chrono::Utc::now().timestamp_millis()
	}
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicI64,
}

impl ManualClock {
	pub const fn new(start: i64) -> Self {
		Self { now: AtomicI64::new(start) }
	}

	pub fn set(&self, now: i64) {
		self.now.store(now, Ordering::SeqCst);
	}

	pub fn advance(&self, millis: i64) -> i64 {
		self.now.fetch_add(millis, Ordering::SeqCst) + millis
	}
}

impl Clock for ManualClock {
	fn now_millis(&self) -> i64 {
		self.now.load(Ordering::SeqCst)
	}
}
