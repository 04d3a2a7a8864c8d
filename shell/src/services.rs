use crate::{clock::Clock, input::InputBridge, render_lock::RenderLock, scene::Scene};
use std::sync::Arc;

pub type SharedScene = Arc<RenderLock<dyn Scene>>;

/// Everything the core needs from the device, built once at startup and
/// handed to the lifecycle manager, which passes it on to every app.
#[derive(Clone)]
pub struct Services {
	input: Arc<InputBridge>,
	scene: SharedScene,
	clock: Arc<dyn Clock>,
}
impl Services {
	pub fn new(input: Arc<InputBridge>, scene: SharedScene, clock: Arc<dyn Clock>) -> Self {
		Services {
			input,
			scene,
			clock,
		}
	}

	pub fn input(&self) -> &Arc<InputBridge> {
		&self.input
	}
	pub fn scene(&self) -> &SharedScene {
		&self.scene
	}
	pub fn clock(&self) -> &Arc<dyn Clock> {
		&self.clock
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use super::*;
	use crate::{clock::ManualClock, scene::testing::NullScene};
	use std::time::Duration;

	pub fn services() -> Services {
		let scene: SharedScene = Arc::new(RenderLock::new(
			NullScene::default(),
			Duration::from_millis(100),
		));
		Services::new(
			Arc::new(InputBridge::new(Duration::from_millis(100))),
			scene,
			Arc::new(ManualClock::default()),
		)
	}
}
