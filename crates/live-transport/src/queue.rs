use std::collections::VecDeque;

/// Frames waiting for the next open connection.
///
/// Bounded FIFO: once `capacity` is exceeded the oldest frames are dropped
/// so the newest always survive.
#[derive(Debug)]
pub struct OutboundQueue {
	frames: VecDeque<String>,
	capacity: usize,
	dropped: u64,
}

impl OutboundQueue {
	pub fn new(capacity: usize) -> Self {
		Self {
			frames: VecDeque::with_capacity(capacity),
			capacity,
			dropped: 0,
		}
	}

	/// Append a frame; returns how many old frames were evicted to make room
	pub fn push(&mut self, frame: String) -> usize {
		self.frames.push_back(frame);
		let overflow = self.frames.len().saturating_sub(self.capacity);
		self.frames.drain(..overflow);
		self.dropped += overflow as u64;
		overflow
	}

	/// Put back a frame that could not be written, ahead of everything else
	pub fn requeue(&mut self, frame: String) {
		self.frames.push_front(frame);
	}

	pub fn pop(&mut self) -> Option<String> {
		self.frames.pop_front()
	}

	pub fn len(&self) -> usize {
		self.frames.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	pub const fn capacity(&self) -> usize {
		self.capacity
	}

	/// Total frames evicted over the queue's lifetime
	pub const fn dropped(&self) -> u64 {
		self.dropped
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frames(queue: &mut OutboundQueue) -> Vec<String> {
		std::iter::from_fn(|| queue.pop()).collect()
	}

	#[test]
	fn test_fifo_under_capacity() {
		let mut queue = OutboundQueue::new(10);
		for i in 0..3 {
			assert_eq!(queue.push(format!("m{i}")), 0);
		}

		assert_eq!(frames(&mut queue), vec!["m0", "m1", "m2"]);
	}

	#[test]
	fn test_overflow_keeps_last_n_in_order() {
		let mut queue = OutboundQueue::new(3);
		for i in 0..7 {
			queue.push(format!("m{i}"));
		}

		assert_eq!(queue.len(), 3);
		assert_eq!(queue.dropped(), 4);
		assert_eq!(frames(&mut queue), vec!["m4", "m5", "m6"]);
	}

	#[test]
	fn test_requeue_goes_first() {
		let mut queue = OutboundQueue::new(5);
		queue.push("a".to_string());
		queue.push("b".to_string());

		let head = queue.pop().unwrap();
		queue.requeue(head);

		assert_eq!(frames(&mut queue), vec!["a", "b"]);
	}

	#[test]
	fn test_zero_capacity_keeps_nothing() {
		let mut queue = OutboundQueue::new(0);
		assert_eq!(queue.push("a".to_string()), 1);
		assert!(queue.is_empty());
	}
}
