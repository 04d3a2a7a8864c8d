use crate::{
	config::LauncherConfig,
	view::{LaunchHistory, LauncherView, ViewState},
};
use shell::{AppContext, AppDescriptor, AppInfo, Application, IconRef, Result};
use tracing::info;

/// The home app: shows every other installed app on the paged launcher and
/// opens whichever one gets clicked.
pub struct AppLauncher {
	config: LauncherConfig,
	view: Option<LauncherView>,
	history: LaunchHistory,
}
impl AppLauncher {
	pub fn new(config: LauncherConfig) -> Self {
		AppLauncher {
			config,
			view: None,
			history: LaunchHistory::default(),
		}
	}

	/// What the next view will be restored from.
	pub fn history(&self) -> LaunchHistory {
		self.view.as_ref().map_or(self.history, |v| v.history())
	}

	fn open_view(&mut self, ctx: &AppContext) -> Result<()> {
		let descriptors = ctx.other_descriptors().cloned().collect::<Vec<AppDescriptor>>();
		let mut scene = ctx.services().scene().acquire()?;
		let mut view = LauncherView::new(self.config.clone(), ctx.services().clock().clone());
		view.init(&mut *scene, &descriptors, self.history);
		self.view = Some(view);
		Ok(())
	}
}
impl Default for AppLauncher {
	fn default() -> Self {
		AppLauncher::new(LauncherConfig::default())
	}
}
impl Application for AppLauncher {
	fn info(&self) -> AppInfo {
		AppInfo::new("LAUNCHER").icon(IconRef::new("launcher/icon"))
	}

	fn on_create(&mut self, ctx: &mut AppContext) -> Result<()> {
		info!("launcher created, opening itself");
		ctx.open_app(ctx.id());
		Ok(())
	}

	fn on_open(&mut self, ctx: &mut AppContext) -> Result<()> {
		self.open_view(ctx)
	}

	fn on_running(&mut self, ctx: &mut AppContext) -> Result<()> {
		let installed = ctx.other_descriptors().count();
		if self.view.as_ref().is_some_and(|v| v.page_count() != installed) {
			info!(installed, "app roster changed, rebuilding launcher");
			if let Some(mut view) = self.view.take() {
				let entrance_running = view.state() == ViewState::Startup;
				self.history = view.destroy(&mut *ctx.services().scene().acquire()?);
				// an app installed during the entrance restarts it
				self.history.entrance_played &= !entrance_running;
			}
			self.open_view(ctx)?;
		}

		let Some(view) = &mut self.view else {
			return Ok(());
		};
		let selected = {
			let mut scene = ctx.services().scene().acquire()?;
			view.update(&mut *scene)
		};
		if let Some(id) = selected {
			info!(%id, "opening selected app");
			ctx.open_app(id);
		}
		Ok(())
	}

	fn on_close(&mut self, ctx: &mut AppContext) -> Result<()> {
		if let Some(mut view) = self.view.take() {
			let mut scene = ctx.services().scene().acquire()?;
			self.history = view.destroy(&mut *scene);
		}
		Ok(())
	}
}
