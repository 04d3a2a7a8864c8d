use crate::error::{Result, ShellError};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::{
	ops::{Deref, DerefMut},
	sync::atomic::{AtomicU64, Ordering},
	time::Duration,
};
use tracing::error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LockStats {
	pub acquired: u64,
	pub released: u64,
}

/// Serializes every mutation of the visual tree against the render pass.
///
/// The tree lives inside the lock, so the only way to touch it is through a
/// [`RenderGuard`], and the guard releases on every exit path. Acquisition
/// waits at most `timeout`; running out is fatal.
pub struct RenderLock<T: ?Sized> {
	timeout: Duration,
	acquired: AtomicU64,
	released: AtomicU64,
	inner: Mutex<T>,
}
impl<T> RenderLock<T> {
	pub fn new(inner: T, timeout: Duration) -> Self {
		RenderLock {
			timeout,
			acquired: AtomicU64::new(0),
			released: AtomicU64::new(0),
			inner: Mutex::new(inner),
		}
	}
}
impl<T: ?Sized> RenderLock<T> {
	pub fn acquire(&self) -> Result<RenderGuard<'_, T>> {
		let Some(guard) = self.inner.try_lock_for(self.timeout) else {
			let stats = self.stats();
			error!(
				waited = ?self.timeout,
				acquired = stats.acquired,
				released = stats.released,
				"render lock timed out, refusing to mutate the scene"
			);
			return Err(ShellError::LockTimeout {
				resource: "render",
				waited: self.timeout,
			});
		};
		self.acquired.fetch_add(1, Ordering::SeqCst);
		Ok(RenderGuard { lock: self, guard })
	}

	/// Runs `f` with the lock held for its whole duration.
	pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
		let mut guard = self.acquire()?;
		Ok(f(&mut guard))
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}
	pub fn stats(&self) -> LockStats {
		LockStats {
			acquired: self.acquired.load(Ordering::SeqCst),
			released: self.released.load(Ordering::SeqCst),
		}
	}
}

pub struct RenderGuard<'a, T: ?Sized> {
	lock: &'a RenderLock<T>,
	guard: MutexGuard<'a, T>,
}
impl<T: ?Sized> Deref for RenderGuard<'_, T> {
	type Target = T;
	fn deref(&self) -> &T {
		&self.guard
	}
}
impl<T: ?Sized> DerefMut for RenderGuard<'_, T> {
	fn deref_mut(&mut self) -> &mut T {
		&mut self.guard
	}
}
impl<T: ?Sized> Drop for RenderGuard<'_, T> {
	fn drop(&mut self) {
		self.lock.released.fetch_add(1, Ordering::SeqCst);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::{
		sync::{
			atomic::{AtomicBool, AtomicUsize},
			Arc,
		},
		thread,
	};

	#[test]
	fn guard_releases_on_early_return() {
		let lock = RenderLock::new(0u32, Duration::from_millis(100));
		fn bump(lock: &RenderLock<u32>, bail: bool) -> Result<()> {
			let mut value = lock.acquire()?;
			if bail {
				return Ok(());
			}
			*value += 1;
			Ok(())
		}
		bump(&lock, true).unwrap();
		bump(&lock, false).unwrap();
		assert_eq!(lock.with(|v| *v).unwrap(), 1);
		assert_eq!(
			lock.stats(),
			LockStats {
				acquired: 3,
				released: 3
			}
		);
	}

	#[test]
	fn timeout_is_reported_and_nothing_is_counted() {
		let lock = RenderLock::new((), Duration::from_millis(10));
		let _held = lock.acquire().unwrap();
		let err = lock.acquire().err().unwrap();
		assert_eq!(
			err,
			ShellError::LockTimeout {
				resource: "render",
				waited: Duration::from_millis(10)
			}
		);
		assert_eq!(lock.stats().acquired, 1);
	}

	#[test]
	fn concurrent_writers_never_overlap() {
		let lock = Arc::new(RenderLock::new(Vec::<usize>::new(), Duration::from_secs(5)));
		let inside = Arc::new(AtomicBool::new(false));
		let overlaps = Arc::new(AtomicUsize::new(0));

		let workers: Vec<_> = (0..4)
			.map(|worker| {
				let lock = lock.clone();
				let inside = inside.clone();
				let overlaps = overlaps.clone();
				thread::spawn(move || {
					for i in 0..500 {
						let mut tree = lock.acquire().unwrap();
						if inside.swap(true, Ordering::SeqCst) {
							overlaps.fetch_add(1, Ordering::SeqCst);
						}
						tree.push(worker * 1000 + i);
						inside.store(false, Ordering::SeqCst);
					}
				})
			})
			.collect();
		for worker in workers {
			worker.join().unwrap();
		}

		assert_eq!(overlaps.load(Ordering::SeqCst), 0);
		assert_eq!(lock.with(|tree| tree.len()).unwrap(), 2000);
		let stats = lock.stats();
		assert_eq!(stats.acquired, stats.released);
		assert_eq!(stats.acquired, 2001);
	}

	#[test]
	fn unsized_contents() {
		trait Named {
			fn name(&self) -> &str;
		}
		struct Panel;
		impl Named for Panel {
			fn name(&self) -> &str {
				"panel"
			}
		}
		let lock: Arc<RenderLock<dyn Named + Send>> =
			Arc::new(RenderLock::new(Panel, Duration::from_millis(10)));
		assert_eq!(lock.acquire().unwrap().name(), "panel");
	}
}
