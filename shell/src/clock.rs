use std::{
	sync::atomic::{AtomicU64, Ordering},
	thread,
	time::{Duration, Instant},
};

/// Monotonic millisecond clock plus a cooperative delay.
pub trait Clock: Send + Sync {
	fn millis(&self) -> u64;
	fn delay(&self, ms: u64);
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
	epoch: Instant,
}
impl SystemClock {
	pub fn new() -> Self {
		SystemClock {
			epoch: Instant::now(),
		}
	}
}
impl Default for SystemClock {
	fn default() -> Self {
		Self::new()
	}
}
impl Clock for SystemClock {
	fn millis(&self) -> u64 {
		self.epoch.elapsed().as_millis() as u64
	}
	fn delay(&self, ms: u64) {
		thread::sleep(Duration::from_millis(ms));
	}
}

/// Clock that only moves when told to. `delay` advances it instead of sleeping.
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicU64,
}
impl ManualClock {
	pub fn new(start_ms: u64) -> Self {
		ManualClock {
			now: AtomicU64::new(start_ms),
		}
	}
	pub fn advance(&self, ms: u64) {
		self.now.fetch_add(ms, Ordering::SeqCst);
	}
	pub fn set(&self, ms: u64) {
		self.now.store(ms, Ordering::SeqCst);
	}
}
impl Clock for ManualClock {
	fn millis(&self) -> u64 {
		self.now.load(Ordering::SeqCst)
	}
	fn delay(&self, ms: u64) {
		self.advance(ms);
	}
}
