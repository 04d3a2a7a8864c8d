//! The home screen: a horizontally paged launcher listing every installed app.

mod animation;
mod app_launcher;
pub mod config;
pub mod headless;
pub mod paging;
mod view;

pub use animation::{AnimatedColor, Spring};
pub use app_launcher::AppLauncher;
pub use config::LauncherConfig;
pub use headless::HeadlessScene;
pub use view::{LaunchHistory, LauncherView, ViewState};

use shell::Rgb;

pub const SCREEN_WIDTH: f32 = 320.0;
pub const SCREEN_HEIGHT: f32 = 240.0;
pub const DEFAULT_BACKGROUND: Rgb = Rgb::hex(0xF6F6F6);
