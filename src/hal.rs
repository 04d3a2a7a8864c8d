use color_eyre::eyre::{eyre, Result};
use launcher::HeadlessScene;
use shell::{Clock, InputBridge, RenderLock, Services, SystemClock};
use std::{
	sync::Arc,
	thread::{self, JoinHandle},
	time::Duration,
};
use tracing::{debug, error, info, trace};

/// One scripted touch report, sent `after_ms` after the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchStep {
	pub after_ms: u64,
	pub count: u8,
	pub x: i32,
	pub y: i32,
}
impl TouchStep {
	pub fn press(after_ms: u64, x: i32, y: i32) -> Self {
		TouchStep { after_ms, count: 1, x, y }
	}
	pub fn release(after_ms: u64) -> Self {
		TouchStep {
			after_ms,
			count: 0,
			x: -1,
			y: -1,
		}
	}
}

pub fn tap(after_ms: u64, x: i32, y: i32) -> [TouchStep; 2] {
	[TouchStep::press(after_ms, x, y), TouchStep::release(60)]
}

pub fn swipe(after_ms: u64, from: (i32, i32), to: (i32, i32), steps: i32) -> Vec<TouchStep> {
	let mut script = vec![TouchStep::press(after_ms, from.0, from.1)];
	script.extend((1..=steps).map(|i| {
		TouchStep::press(
			16,
			from.0 + (to.0 - from.0) * i / steps,
			from.1 + (to.1 - from.1) * i / steps,
		)
	}));
	script.push(TouchStep::release(16));
	script
}

/// Walks through the launcher: swipe a page, step with the arrow, open the
/// sentinel and quit it, then open the agent and let its session run out.
pub fn demo_script() -> Vec<TouchStep> {
	let mut script = swipe(1500, (260, 120), (60, 120), 12);
	script.extend(tap(700, 300, 120));
	script.extend(tap(700, 160, 110));
	script.extend(tap(2500, 160, 120));
	script.extend(tap(800, 20, 120));
	script.extend(tap(700, 160, 110));
	// masked while the agent holds exclusive input
	script.extend(tap(500, 160, 110));
	script
}

/// The simulated device: a monotonic clock, the touch bridge shared with the
/// polling thread and the display behind the render lock.
pub struct Hal {
	clock: Arc<SystemClock>,
	input: Arc<InputBridge>,
	scene: Arc<RenderLock<HeadlessScene>>,
	last_frame: u64,
	frames: u64,
}
impl Hal {
	pub fn new(width: f32, height: f32, lock_timeout: Duration) -> Self {
		info!(width, height, ?lock_timeout, "bringing up simulated display");
		Hal {
			clock: Arc::new(SystemClock::new()),
			input: Arc::new(InputBridge::new(lock_timeout)),
			scene: Arc::new(RenderLock::new(HeadlessScene::new(width, height), lock_timeout)),
			last_frame: 0,
			frames: 0,
		}
	}

	pub fn services(&self) -> Services {
		Services::new(self.input.clone(), self.scene.clone(), self.clock.clone())
	}
	pub fn input(&self) -> &Arc<InputBridge> {
		&self.input
	}
	pub fn scene(&self) -> &Arc<RenderLock<HeadlessScene>> {
		&self.scene
	}

	/// Hands the latest touch sample to the display and advances its
	/// animations, like the display driver's timer handler would.
	pub fn render_frame(&mut self) -> Result<()> {
		let now = self.clock.millis();
		let dt = now.saturating_sub(self.last_frame) as f64 / 1000.0;
		self.last_frame = now;
		self.frames += 1;

		let touch = self.input.sample()?;
		self.scene.with(|scene| {
			scene.feed_touch(touch);
			scene.advance(dt);
		})?;
		Ok(())
	}

	/// Marks the loop as alive. The loop yields to the runtime on every
	/// interval tick, so there is nothing to hand back here.
	pub fn feed_the_dog(&self) {
		if self.frames % 1000 == 0 {
			trace!(frames = self.frames, "watchdog fed");
		}
	}

	/// Replays `script` into the input bridge from a separate thread, the way
	/// the touch controller's polling task reports into it on the device.
	pub fn spawn_touch_driver(&self, script: Vec<TouchStep>) -> Result<TouchDriver> {
		let input = self.input.clone();
		let clock = self.clock.clone();
		let handle = thread::Builder::new().name("touch-poll".to_string()).spawn(move || -> shell::Result<()> {
			for step in script {
				clock.delay(step.after_ms);
				debug!(?step, "touch");
				input.report_touch(step.count, step.x, step.y)?;
			}
			info!("touch script finished");
			Ok(())
		})?;
		Ok(TouchDriver::new(handle))
	}
}

/// Handle on the touch-poll thread. A lock timeout in there is as fatal as
/// one on the UI thread, so the loop checks on it every tick.
pub struct TouchDriver {
	handle: Option<JoinHandle<shell::Result<()>>>,
}
impl TouchDriver {
	fn new(handle: JoinHandle<shell::Result<()>>) -> Self {
		TouchDriver { handle: Some(handle) }
	}

	/// Surfaces the thread's error once it has stopped. A cleanly finished
	/// script is only reported once.
	pub fn check(&mut self) -> Result<()> {
		if !self.handle.as_ref().is_some_and(|h| h.is_finished()) {
			return Ok(());
		}
		let Some(handle) = self.handle.take() else {
			return Ok(());
		};
		match handle.join() {
			Ok(Ok(())) => Ok(()),
			Ok(Err(e)) => {
				error!(%e, "touch-poll thread failed");
				Err(e.into())
			}
			Err(_) => Err(eyre!("touch-poll thread panicked")),
		}
	}
}
