use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub type DelayFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// Reconnect delay as a function of the attempt number (starting at 0)
#[derive(Clone)]
pub enum Backoff {
	/// `min(ceiling, initial × 2^n)` plus 20–40 % random jitter, clamped to the ceiling
	Jittered { initial: Duration, ceiling: Duration },
	/// `min(ceiling, initial × 2^n)`
	Exponential { initial: Duration, ceiling: Duration },
	Custom(DelayFn),
}

impl Default for Backoff {
	fn default() -> Self {
		Self::Jittered {
			initial: Duration::from_millis(1200),
			ceiling: Duration::from_secs(15),
		}
	}
}

impl fmt::Debug for Backoff {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Jittered { initial, ceiling } => f.debug_struct("Jittered").field("initial", initial).field("ceiling", ceiling).finish(),
			Self::Exponential { initial, ceiling } => f.debug_struct("Exponential").field("initial", initial).field("ceiling", ceiling).finish(),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

impl Backoff {
	pub fn custom<F>(delay: F) -> Self
	where
		F: Fn(u32) -> Duration + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(delay))
	}

	pub fn delay(&self, attempt: u32) -> Duration {
		match self {
			Self::Jittered { initial, ceiling } => {
				let base = capped_exponential(*initial, *ceiling, attempt);
				let jitter = base.mul_f64(rand::rng().random_range(0.2..0.4));
				(base + jitter).min(*ceiling)
			}
			Self::Exponential { initial, ceiling } => capped_exponential(*initial, *ceiling, attempt),
			Self::Custom(delay) => delay(attempt),
		}
	}
}

fn capped_exponential(initial: Duration, ceiling: Duration, attempt: u32) -> Duration {
	2u32.checked_pow(attempt).and_then(|factor| initial.checked_mul(factor)).unwrap_or(ceiling).min(ceiling)
}

/// Tracks consecutive failed attempts since the last successful open
#[derive(Debug, Clone)]
pub struct RetryPolicy {
	backoff: Backoff,
	attempts: u32,
}

impl RetryPolicy {
	pub const fn new(backoff: Backoff) -> Self {
		Self { backoff, attempts: 0 }
	}

	/// Delay before the next attempt; advances the attempt counter
	pub fn next_delay(&mut self) -> Duration {
		let delay = self.backoff.delay(self.attempts);
		self.attempts = self.attempts.saturating_add(1);
		delay
	}

	pub const fn attempts(&self) -> u32 {
		self.attempts
	}

	pub fn reset(&mut self) {
		self.attempts = 0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_live_sync_schedule() {
		let mut policy = RetryPolicy::new(Backoff::Exponential {
			initial: Duration::from_millis(1200),
			ceiling: Duration::from_secs(12),
		});

		let delays: Vec<u128> = (0..7).map(|_| policy.next_delay().as_millis()).collect();

		assert_eq!(delays, vec![1200, 2400, 4800, 9600, 12000, 12000, 12000]);
		assert_eq!(policy.attempts(), 7);
	}

	#[test]
	fn test_jittered_is_monotonic_and_capped() {
		let backoff = Backoff::default();
		let ceiling = Duration::from_secs(15);

		for _ in 0..200 {
			let mut previous = Duration::ZERO;
			for attempt in 0..12 {
				let delay = backoff.delay(attempt);
				assert!(delay >= previous, "attempt {attempt}: {delay:?} < {previous:?}");
				assert!(delay <= ceiling, "attempt {attempt}: {delay:?} above ceiling");
				previous = delay;
			}
		}
	}

	#[test]
	fn test_jitter_adds_at_least_twenty_percent() {
		let delay = Backoff::default().delay(0);
		assert!(delay >= Duration::from_millis(1440));
		assert!(delay <= Duration::from_millis(1680));
	}

	#[test]
	fn test_huge_attempt_does_not_overflow() {
		let backoff = Backoff::Exponential {
			initial: Duration::from_millis(1200),
			ceiling: Duration::from_secs(12),
		};
		assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(12));
	}

	#[test]
	fn test_custom_delay_and_reset() {
		let mut policy = RetryPolicy::new(Backoff::custom(|attempt| Duration::from_millis(u64::from(attempt) * 10)));

		assert_eq!(policy.next_delay(), Duration::ZERO);
		assert_eq!(policy.next_delay(), Duration::from_millis(10));

		policy.reset();

		assert_eq!(policy.attempts(), 0);
		assert_eq!(policy.next_delay(), Duration::ZERO);
	}
}
