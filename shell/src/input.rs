use crate::error::{Result, ShellError};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

/// Latest sample from the single-touch panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchState {
	/// Number of contacts, 0 or 1.
	pub count: u8,
	pub x: i32,
	pub y: i32,
}
impl TouchState {
	pub const RELEASED: TouchState = TouchState {
		count: 0,
		x: -1,
		y: -1,
	};

	pub fn pressed(x: i32, y: i32) -> Self {
		TouchState { count: 1, x, y }
	}
	pub fn is_pressed(&self) -> bool {
		self.count > 0
	}
}
impl Default for TouchState {
	fn default() -> Self {
		Self::RELEASED
	}
}

#[derive(Debug, Default)]
struct BridgeData {
	touch: TouchState,
	exclusive: bool,
}

/// The only state shared between the input-polling context and the UI
/// thread. Latest value wins; there is no queue, so a touch shorter than one
/// UI frame can be missed.
#[derive(Debug)]
pub struct InputBridge {
	data: Mutex<BridgeData>,
	timeout: Duration,
}
impl InputBridge {
	pub fn new(timeout: Duration) -> Self {
		InputBridge {
			data: Mutex::new(BridgeData::default()),
			timeout,
		}
	}

	fn lock(&self) -> Result<MutexGuard<'_, BridgeData>> {
		self.data.try_lock_for(self.timeout).ok_or_else(|| {
			error!(waited = ?self.timeout, "input bridge lock timed out");
			ShellError::LockTimeout {
				resource: "input bridge",
				waited: self.timeout,
			}
		})
	}

	/// Called from the input-polling context. Overwrites the stored sample.
	pub fn report_touch(&self, count: u8, x: i32, y: i32) -> Result<()> {
		let touch = if count == 0 {
			TouchState::RELEASED
		} else {
			TouchState::pressed(x, y)
		};
		self.lock()?.touch = touch;
		Ok(())
	}

	/// Called once per frame by the rendering loop. Reports no contact while
	/// exclusive mode is set, whatever the stored sample says.
	pub fn sample(&self) -> Result<TouchState> {
		let data = self.lock()?;
		if data.exclusive {
			return Ok(TouchState::RELEASED);
		}
		Ok(data.touch)
	}

	pub fn set_exclusive_mode(&self, exclusive: bool) -> Result<()> {
		self.lock()?.exclusive = exclusive;
		Ok(())
	}
	pub fn is_exclusive_mode(&self) -> Result<bool> {
		Ok(self.lock()?.exclusive)
	}
}
