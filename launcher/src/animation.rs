use glam::Vec3;
use shell::Rgb;
use tween::{QuartInOut, Tweener};

fn to_vec3(color: Rgb) -> Vec3 {
	Vec3::new(color.r() as f32, color.g() as f32, color.b() as f32)
}
fn to_rgb(v: Vec3) -> Rgb {
	let v = v.round().clamp(Vec3::ZERO, Vec3::splat(255.0));
	Rgb::from_channels(v.x as u8, v.y as u8, v.z as u8)
}

/// A color easing toward a target over a fixed duration.
#[derive(Debug)]
pub struct AnimatedColor {
	start: Vec3,
	current: Vec3,
	target: Vec3,
	progress: f32,
	duration: f64,
	tweener: Option<Tweener<f32, f64, QuartInOut>>,
}
impl AnimatedColor {
	pub fn new(initial: Rgb, duration_secs: f64) -> Self {
		let initial = to_vec3(initial);
		AnimatedColor {
			start: initial,
			current: initial,
			target: initial,
			progress: 1.0,
			duration: duration_secs,
			tweener: None,
		}
	}

	/// Starts easing from wherever the color is now.
	pub fn retarget(&mut self, target: Rgb) {
		self.start = self.current;
		self.target = to_vec3(target);
		self.progress = 0.0;
		self.tweener = Some(Tweener::quart_in_out(0.0, 1.0, self.duration));
	}

	pub fn jump_to(&mut self, color: Rgb) {
		let color = to_vec3(color);
		self.start = color;
		self.current = color;
		self.target = color;
		self.progress = 1.0;
		self.tweener = None;
	}

	pub fn advance(&mut self, dt_secs: f64) -> Rgb {
		if let Some(tweener) = &mut self.tweener {
			let t = tweener.move_by(dt_secs).clamp(0.0, 1.0);
			if tweener.is_finished() {
				self.current = self.target;
				self.progress = 1.0;
				self.tweener = None;
			} else {
				self.current = self.start.lerp(self.target, t);
				self.progress = t;
			}
		}
		self.value()
	}

	pub fn value(&self) -> Rgb {
		to_rgb(self.current)
	}
	pub fn target(&self) -> Rgb {
		to_rgb(self.target)
	}
	pub fn progress(&self) -> f32 {
		self.progress
	}
	pub fn is_done(&self) -> bool {
		self.tweener.is_none()
	}
}

/// Longest step the integrator takes, so a late frame cannot blow it up.
const MAX_STEP_SECS: f32 = 0.05;
const REST_DISTANCE: f32 = 0.5;
const REST_VELOCITY: f32 = 10.0;
/// Softest spring accepted; anything at or below zero would never come to rest.
const MIN_STIFFNESS: f32 = 1.0;

/// Critically damped spring. Its duration falls out of the stiffness.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
	value: f32,
	velocity: f32,
	target: f32,
	stiffness: f32,
	damping: f32,
	done: bool,
}
impl Spring {
	pub fn critically_damped(start: f32, target: f32, stiffness: f32) -> Self {
		// NaN compares false, so it lands on the minimum too
		let stiffness = if stiffness >= MIN_STIFFNESS { stiffness } else { MIN_STIFFNESS };
		Spring {
			value: start,
			velocity: 0.0,
			target,
			stiffness,
			damping: 2.0 * stiffness.sqrt(),
			done: start == target,
		}
	}

	pub fn step(&mut self, dt_secs: f32) -> f32 {
		if self.done {
			return self.value;
		}
		let dt = dt_secs.clamp(0.0, MAX_STEP_SECS);
		let force = (self.target - self.value) * self.stiffness - self.velocity * self.damping;
		self.velocity += force * dt;
		self.value += self.velocity * dt;

		if (self.target - self.value).abs() < REST_DISTANCE && self.velocity.abs() < REST_VELOCITY {
			self.value = self.target;
			self.velocity = 0.0;
			self.done = true;
		}
		self.value
	}

	pub fn value(&self) -> f32 {
		self.value
	}
	pub fn target(&self) -> f32 {
		self.target
	}
	pub fn is_done(&self) -> bool {
		self.done
	}
}
