use shell::{AppContext, AppInfo, Application, Clock, IconRef, NodeId, NodeKind, Result, Rgb, Scene};
use tracing::info;

const HEARTBEAT_MS: u64 = 1000;

/// Full screen backdrop in `color` with a centered `text` label.
fn draw_page(scene: &mut dyn Scene, color: Rgb, text: &str) -> NodeId {
	let page = scene.create_node(None, NodeKind::Container);
	scene.set_size(page, launcher::SCREEN_WIDTH, launcher::SCREEN_HEIGHT);
	scene.set_bg_color(page, color);
	let label = scene.create_node(Some(page), NodeKind::Label(text.to_string()));
	scene.set_position(label, 0.0, -80.0);
	page
}

/// Fires once every [`HEARTBEAT_MS`].
#[derive(Debug, Default)]
struct Heartbeat {
	last: u64,
}
impl Heartbeat {
	fn reset(&mut self, now: u64) {
		self.last = now;
	}
	fn due(&mut self, now: u64) -> bool {
		if now.saturating_sub(self.last) > HEARTBEAT_MS {
			self.last = now;
			return true;
		}
		false
	}
}

/// Placeholder app: a blank page, closed by tapping anywhere.
#[derive(Debug, Default)]
pub struct Dummy {
	page: Option<NodeId>,
	heartbeat: Heartbeat,
}
impl Application for Dummy {
	fn info(&self) -> AppInfo {
		AppInfo::new("DUMMY")
	}

	fn on_open(&mut self, ctx: &mut AppContext) -> Result<()> {
		self.heartbeat.reset(ctx.services().clock().millis());
		let mut scene = ctx.services().scene().acquire()?;
		let page = draw_page(&mut *scene, Rgb::WHITE, "DUMMY");
		scene.set_clickable(page, true);
		self.page = Some(page);
		Ok(())
	}

	fn on_running(&mut self, ctx: &mut AppContext) -> Result<()> {
		if self.heartbeat.due(ctx.services().clock().millis()) {
			info!(id = %ctx.id(), "dummy running");
		}
		let tapped = ctx.services().scene().with(|scene| {
			let mut tapped = false;
			while let Some(node) = scene.poll_click() {
				tapped |= Some(node) == self.page;
			}
			tapped
		})?;
		if tapped {
			ctx.close();
		}
		Ok(())
	}

	fn on_close(&mut self, ctx: &mut AppContext) -> Result<()> {
		if let Some(page) = self.page.take() {
			ctx.services().scene().with(|scene| scene.destroy_node(page))?;
		}
		Ok(())
	}
}

/// Shows a QUIT button that closes the app, and says hi every second.
#[derive(Debug, Default)]
pub struct Sentinel {
	page: Option<NodeId>,
	quit: Option<NodeId>,
	heartbeat: Heartbeat,
}
impl Application for Sentinel {
	fn info(&self) -> AppInfo {
		AppInfo::new("SENTINEL")
			.icon(IconRef::new("icon_sentinel"))
			.theme_color(Rgb::hex(0xFF6699))
	}

	fn on_create(&mut self, _ctx: &mut AppContext) -> Result<()> {
		info!("sentinel created");
		Ok(())
	}

	fn on_open(&mut self, ctx: &mut AppContext) -> Result<()> {
		self.heartbeat.reset(ctx.services().clock().millis());
		let mut scene = ctx.services().scene().acquire()?;
		let page = draw_page(&mut *scene, Rgb::hex(0xFF6699), "SENTINEL");
		let quit = scene.create_node(Some(page), NodeKind::Container);
		scene.set_size(quit, 120.0, 50.0);
		scene.set_radius(quit, 8.0);
		scene.set_bg_color(quit, Rgb::WHITE);
		scene.set_clickable(quit, true);
		scene.create_node(Some(quit), NodeKind::Label("QUIT".to_string()));
		self.page = Some(page);
		self.quit = Some(quit);
		Ok(())
	}

	fn on_running(&mut self, ctx: &mut AppContext) -> Result<()> {
		if self.heartbeat.due(ctx.services().clock().millis()) {
			info!("hi");
		}
		let quit = ctx.services().scene().with(|scene| {
			let mut quit = false;
			while let Some(node) = scene.poll_click() {
				quit |= Some(node) == self.quit;
			}
			quit
		})?;
		if quit {
			info!("quit pressed");
			ctx.close();
		}
		Ok(())
	}

	fn on_close(&mut self, ctx: &mut AppContext) -> Result<()> {
		self.quit = None;
		if let Some(page) = self.page.take() {
			ctx.services().scene().with(|scene| scene.destroy_node(page))?;
		}
		Ok(())
	}
}

/// The voice assistant. While it is open it owns the touch panel, so the UI
/// stops seeing touches. The simulated session ends after `session_ms`.
#[derive(Debug)]
pub struct AiAgent {
	session_ms: u64,
	opened_at: u64,
	overlay: Option<NodeId>,
}
impl AiAgent {
	pub fn new(session_ms: u64) -> Self {
		AiAgent {
			session_ms,
			opened_at: 0,
			overlay: None,
		}
	}
}
impl Default for AiAgent {
	fn default() -> Self {
		AiAgent::new(3000)
	}
}
impl Application for AiAgent {
	fn info(&self) -> AppInfo {
		AppInfo::new("AI.AGENT")
			.icon(IconRef::new("icon_ai_agent"))
			.theme_color(Rgb::hex(0x33CC99))
	}

	fn on_open(&mut self, ctx: &mut AppContext) -> Result<()> {
		info!("starting assistant session");
		self.opened_at = ctx.services().clock().millis();
		ctx.services().input().set_exclusive_mode(true)?;
		let mut scene = ctx.services().scene().acquire()?;
		self.overlay = Some(draw_page(&mut *scene, Rgb::hex(0x33CC99), "LISTENING"));
		Ok(())
	}

	fn on_running(&mut self, ctx: &mut AppContext) -> Result<()> {
		if ctx.services().clock().millis().saturating_sub(self.opened_at) >= self.session_ms {
			info!("assistant session over");
			ctx.close();
		}
		Ok(())
	}

	fn on_close(&mut self, ctx: &mut AppContext) -> Result<()> {
		ctx.services().input().set_exclusive_mode(false)?;
		if let Some(overlay) = self.overlay.take() {
			ctx.services().scene().with(|scene| scene.destroy_node(overlay))?;
		}
		Ok(())
	}
}
