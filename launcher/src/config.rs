use serde::{Deserialize, Serialize};
use shell::Rgb;

/// Layout and animation tuning for the launcher. Every field has a default,
/// so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
	pub screen_width: f32,
	pub screen_height: f32,
	/// Horizontal distance between two slots.
	pub page_gap: f32,
	pub icon_size: f32,
	pub icon_radius: f32,
	pub icon_y: f32,
	/// Label distance below the icon center.
	pub label_offset: f32,
	/// Background when the page's app has no theme color.
	pub default_background: Rgb,
	pub color_transition_secs: f64,
	/// Panel starts this far below its resting place on first boot.
	pub entrance_offset: f32,
	pub entrance_radius: f32,
	pub spring_stiffness: f32,
	pub indicator_size: f32,
	pub indicator_margin: f32,
	pub indicator_opacity_low: f32,
	pub indicator_opacity_high: f32,
	pub dot_size: f32,
	pub dot_size_active: f32,
	pub dot_spacing: f32,
	pub dot_opacity: f32,
}
impl Default for LauncherConfig {
	fn default() -> Self {
		LauncherConfig {
			screen_width: crate::SCREEN_WIDTH,
			screen_height: crate::SCREEN_HEIGHT,
			page_gap: 320.0,
			icon_size: 160.0,
			icon_radius: 12.0,
			icon_y: -10.0,
			label_offset: 100.0,
			default_background: crate::DEFAULT_BACKGROUND,
			color_transition_secs: 0.3,
			entrance_offset: crate::SCREEN_HEIGHT,
			entrance_radius: 48.0,
			spring_stiffness: 170.0,
			indicator_size: 32.0,
			indicator_margin: 20.0,
			indicator_opacity_low: 0.2,
			indicator_opacity_high: 1.0,
			dot_size: 6.0,
			dot_size_active: 10.0,
			dot_spacing: 14.0,
			dot_opacity: 0.4,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config: LauncherConfig =
			serde_json::from_str(r#"{ "page_gap": 196.0, "default_background": 16777215 }"#).unwrap();
		assert_eq!(config.page_gap, 196.0);
		assert_eq!(config.default_background, Rgb::WHITE);
		assert_eq!(config.icon_size, LauncherConfig::default().icon_size);
	}

	#[test]
	fn colors_wider_than_24_bits_are_masked() {
		let config: LauncherConfig = serde_json::from_str(r#"{ "default_background": 4294967295 }"#).unwrap();
		assert_eq!(config.default_background.value() & !0xFF_FFFF, 0);
		assert_eq!(config.default_background, Rgb::WHITE);
		assert_eq!(config.default_background.to_string(), "#FFFFFF");
	}
}
