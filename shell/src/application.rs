use crate::{error::Result, services::Services};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable application id, handed out at install time and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppId(pub u32);
impl fmt::Display for AppId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// 24-bit RGB color, `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32")]
pub struct Rgb(u32);
impl Rgb {
	pub const WHITE: Rgb = Rgb(0xFFFFFF);
	pub const BLACK: Rgb = Rgb(0x000000);

	pub const fn hex(value: u32) -> Self {
		Rgb(value & 0xFF_FFFF)
	}
	pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
		Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
	}
	pub const fn value(self) -> u32 {
		self.0
	}
	pub const fn r(self) -> u8 {
		(self.0 >> 16) as u8
	}
	pub const fn g(self) -> u8 {
		(self.0 >> 8) as u8
	}
	pub const fn b(self) -> u8 {
		self.0 as u8
	}
}
impl From<u32> for Rgb {
	fn from(value: u32) -> Self {
		Rgb::hex(value)
	}
}
impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:06X}", self.0)
	}
}

/// Opaque icon handle. Only the rendering backend knows how to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRef(String);
impl IconRef {
	pub fn new(key: impl Into<String>) -> Self {
		IconRef(key.into())
	}
	pub fn key(&self) -> &str {
		&self.0
	}
}

/// Metadata an application reports about itself before it is installed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
	pub name: String,
	pub icon: Option<IconRef>,
	pub theme_color: Option<Rgb>,
}
impl AppInfo {
	pub fn new(name: impl Into<String>) -> Self {
		AppInfo {
			name: name.into(),
			..Default::default()
		}
	}
	pub fn icon(mut self, icon: IconRef) -> Self {
		self.icon = Some(icon);
		self
	}
	pub fn theme_color(mut self, color: Rgb) -> Self {
		self.theme_color = Some(color);
		self
	}
}

/// An installed application as everyone but the lifecycle manager sees it.
/// Immutable once installed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppDescriptor {
	id: AppId,
	info: AppInfo,
}
impl AppDescriptor {
	pub(crate) fn new(id: AppId, info: AppInfo) -> Self {
		AppDescriptor { id, info }
	}

	pub fn id(&self) -> AppId {
		self.id
	}
	pub fn name(&self) -> &str {
		&self.info.name
	}
	pub fn icon(&self) -> Option<&IconRef> {
		self.info.icon.as_ref()
	}
	pub fn theme_color(&self) -> Option<Rgb> {
		self.info.theme_color
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppState {
	Created,
	Opened,
	Running,
	Closed,
}
impl AppState {
	/// Opened and Running apps own the screen; at most one app is ever in either.
	pub fn is_active(self) -> bool {
		matches!(self, AppState::Opened | AppState::Running)
	}
}

/// The four lifecycle callbacks of an installed application.
///
/// `on_running` is called once per scheduler tick while the app is active and
/// must not block: the loop is cooperative, a stalled callback stalls the
/// whole device.
pub trait Application {
	fn info(&self) -> AppInfo;

	fn on_create(&mut self, _ctx: &mut AppContext) -> Result<()> {
		Ok(())
	}
	fn on_open(&mut self, _ctx: &mut AppContext) -> Result<()> {
		Ok(())
	}
	fn on_running(&mut self, _ctx: &mut AppContext) -> Result<()> {
		Ok(())
	}
	fn on_close(&mut self, _ctx: &mut AppContext) -> Result<()> {
		Ok(())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Request {
	Open(AppId),
	Close(AppId),
}

/// Handed to every lifecycle callback. Requests made through it are applied
/// by the lifecycle manager once the callback has returned.
pub struct AppContext<'a> {
	id: AppId,
	descriptors: &'a [AppDescriptor],
	services: &'a Services,
	requests: &'a mut Vec<Request>,
}
impl<'a> AppContext<'a> {
	pub(crate) fn new(
		id: AppId,
		descriptors: &'a [AppDescriptor],
		services: &'a Services,
		requests: &'a mut Vec<Request>,
	) -> Self {
		AppContext {
			id,
			descriptors,
			services,
			requests,
		}
	}

	pub fn id(&self) -> AppId {
		self.id
	}
	pub fn services(&self) -> &Services {
		self.services
	}
	pub fn descriptor(&self) -> Option<&AppDescriptor> {
		self.descriptors.iter().find(|d| d.id == self.id)
	}
	/// Every installed app in install order, including the caller.
	pub fn descriptors(&self) -> &[AppDescriptor] {
		self.descriptors
	}
	pub fn other_descriptors(&self) -> impl Iterator<Item = &AppDescriptor> + '_ {
		let id = self.id;
		self.descriptors.iter().filter(move |d| d.id != id)
	}

	pub fn open_app(&mut self, id: AppId) {
		self.requests.push(Request::Open(id));
	}
	/// Close the calling app. The home app takes over the screen again.
	pub fn close(&mut self) {
		self.requests.push(Request::Close(self.id));
	}
}
