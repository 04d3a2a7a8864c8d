use crate::{
	animation::{AnimatedColor, Spring},
	config::LauncherConfig,
	paging::{edge_fade, neighbor, page_index, slot_x},
};
use serde::{Deserialize, Serialize};
use shell::{AppDescriptor, AppId, Clock, IconRef, NodeId, NodeKind, Rgb, Scene};
use std::sync::Arc;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewState {
	/// Entrance animation playing.
	Startup,
	Normal,
}

/// What the launcher remembers across closing and reopening its view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchHistory {
	/// Slot offset of the most recently clicked icon.
	pub last_selected_x: Option<f32>,
	pub entrance_played: bool,
}
impl LaunchHistory {
	/// Skip the entrance animation once anything has been recorded.
	pub fn restores(&self) -> bool {
		self.last_selected_x.is_some() || self.entrance_played
	}
}

#[derive(Debug)]
struct Slot {
	id: AppId,
	x: f32,
	theme: Rgb,
	icon: NodeId,
	label: NodeId,
}

#[derive(Debug)]
struct Nodes {
	panel: NodeId,
	slots: Vec<Slot>,
	prev: NodeId,
	next: NodeId,
	dots: Vec<NodeId>,
}

#[derive(Debug)]
struct Entrance {
	offset: Spring,
	radius: Spring,
}

/// The paged icon launcher. Page index, background color, page dots and
/// edge fades are all derived from the panel's scroll offset every tick.
pub struct LauncherView {
	config: LauncherConfig,
	clock: Arc<dyn Clock>,
	state: ViewState,
	nodes: Option<Nodes>,
	entrance: Option<Entrance>,
	background: AnimatedColor,
	page: Option<usize>,
	pending: Option<AppId>,
	history: LaunchHistory,
	last_tick: Option<u64>,
}
impl LauncherView {
	pub fn new(config: LauncherConfig, clock: Arc<dyn Clock>) -> Self {
		let background = AnimatedColor::new(config.default_background, config.color_transition_secs);
		LauncherView {
			config,
			clock,
			state: ViewState::Startup,
			nodes: None,
			entrance: None,
			background,
			page: None,
			pending: None,
			history: LaunchHistory::default(),
			last_tick: None,
		}
	}

	/// Builds one slot per descriptor. With a recorded history the view goes
	/// straight to `Normal` on the remembered page, otherwise the entrance
	/// animation plays first.
	#[tracing::instrument(skip_all, fields(pages = descriptors.len()))]
	pub fn init(&mut self, scene: &mut dyn Scene, descriptors: &[AppDescriptor], history: LaunchHistory) {
		if self.nodes.is_some() {
			self.destroy(scene);
		}
		let config = &self.config;

		let panel = scene.create_node(None, NodeKind::Container);
		scene.set_size(panel, config.screen_width, config.screen_height);
		scene.set_position(panel, 0.0, 0.0);
		scene.set_radius(panel, 0.0);
		scene.set_bg_color(panel, config.default_background);
		scene.set_scroll_snap_x(panel, Some(config.page_gap));

		let slots = descriptors
			.iter()
			.enumerate()
			.map(|(i, descriptor)| {
				let x = slot_x(i, config.page_gap);
				let icon = scene.create_node(Some(panel), NodeKind::Container);
				scene.set_position(icon, x, config.icon_y);
				scene.set_size(icon, config.icon_size, config.icon_size);
				scene.set_radius(icon, config.icon_radius);
				scene.set_bg_color(icon, Rgb::WHITE);
				scene.set_clickable(icon, true);
				if let Some(image) = descriptor.icon() {
					scene.create_node(Some(icon), NodeKind::Image(image.clone()));
				}

				let label = scene.create_node(Some(panel), NodeKind::Label(descriptor.name().to_string()));
				scene.set_position(label, x, config.icon_y + config.label_offset);

				Slot {
					id: descriptor.id(),
					x,
					theme: descriptor.theme_color().unwrap_or(config.default_background),
					icon,
					label,
				}
			})
			.collect::<Vec<_>>();

		let edge = config.screen_width / 2.0 - config.indicator_margin;
		let prev = scene.create_node(None, NodeKind::Image(IconRef::new("launcher/arrow_left")));
		let next = scene.create_node(None, NodeKind::Image(IconRef::new("launcher/arrow_right")));
		for (node, x) in [(prev, -edge), (next, edge)] {
			scene.set_position(node, x, 0.0);
			scene.set_size(node, config.indicator_size, config.indicator_size);
			scene.set_clickable(node, true);
		}

		let dots_width = config.dot_spacing * slots.len().saturating_sub(1) as f32;
		let dots = (0..slots.len())
			.map(|i| {
				let dot = scene.create_node(None, NodeKind::Container);
				scene.set_position(
					dot,
					i as f32 * config.dot_spacing - dots_width / 2.0,
					config.screen_height / 2.0 - config.dot_spacing,
				);
				scene.set_radius(dot, config.dot_size_active / 2.0);
				scene.set_bg_color(dot, Rgb::BLACK);
				dot
			})
			.collect();

		let restored = history.restores();
		self.nodes = Some(Nodes {
			panel,
			slots,
			prev,
			next,
			dots,
		});
		self.history = LaunchHistory {
			entrance_played: true,
			..history
		};
		self.pending = None;
		self.page = None;
		self.last_tick = Some(self.clock.millis());

		let scroll = match history.last_selected_x {
			Some(x) if restored => {
				scene.scroll_to_x(panel, x, false);
				x
			}
			_ => 0.0,
		};
		let page = self.page_count().checked_sub(1).map(|last| {
			page_index(scroll, self.config.page_gap, last + 1)
		});
		let theme = page
			.and_then(|page| self.slot(page))
			.map(|slot| slot.theme)
			.unwrap_or(self.config.default_background);
		self.background.jump_to(theme);
		scene.set_bg_color(panel, theme);
		if let Some(page) = page {
			self.show_page(scene, page);
		}
		self.apply_edge_fade(scene, scroll);

		if restored {
			self.state = ViewState::Normal;
			self.entrance = None;
		} else {
			self.state = ViewState::Startup;
			let offset = Spring::critically_damped(self.config.entrance_offset, 0.0, self.config.spring_stiffness);
			let radius = Spring::critically_damped(self.config.entrance_radius, 0.0, self.config.spring_stiffness);
			scene.set_position(panel, 0.0, offset.value());
			scene.set_radius(panel, radius.value());
			self.entrance = Some(Entrance { offset, radius });
		}
		info!(state = ?self.state, page = ?self.page, "launcher view ready");
	}

	/// Advances one tick. Returns the app whose icon was clicked, once per click.
	pub fn update(&mut self, scene: &mut dyn Scene) -> Option<AppId> {
		let now = self.clock.millis();
		let dt = self
			.last_tick
			.map(|last| now.saturating_sub(last) as f64 / 1000.0)
			.unwrap_or_default();
		self.last_tick = Some(now);

		while let Some(node) = scene.poll_click() {
			self.handle_click(scene, node);
		}
		let selected = self.pending.take();

		match self.state {
			ViewState::Startup => self.update_entrance(scene, dt as f32),
			ViewState::Normal => self.update_derived(scene, dt),
		}
		selected
	}

	/// Click subscription entry point. Icon clicks only record the selection;
	/// it is handed out by the next [`LauncherView::update`].
	pub fn handle_click(&mut self, scene: &mut dyn Scene, node: NodeId) {
		let Some(nodes) = &self.nodes else {
			return;
		};
		if node == nodes.prev {
			self.step(scene, -1);
		} else if node == nodes.next {
			self.step(scene, 1);
		} else if let Some(slot) = nodes.slots.iter().find(|s| s.icon == node) {
			debug!(id = %slot.id, x = slot.x, "icon clicked");
			self.pending = Some(slot.id);
			self.history.last_selected_x = Some(slot.x);
		} else {
			trace!(%node, "click on foreign node ignored");
		}
	}

	/// Smooth-scrolls `step` pages from the current one. Returns false, and
	/// does nothing, when that page does not exist.
	pub fn step(&mut self, scene: &mut dyn Scene, step: isize) -> bool {
		let Some(panel) = self.panel() else {
			return false;
		};
		let current = page_index(scene.scroll_x(panel), self.config.page_gap, self.page_count());
		match neighbor(current, step, self.page_count()) {
			Some(target) => self.jump_to(scene, target, true),
			None => {
				debug!(current, step, "navigation past the last page ignored");
				false
			}
		}
	}

	/// Scrolls to page `index`; out-of-range indices are ignored.
	pub fn jump_to(&mut self, scene: &mut dyn Scene, index: usize, animated: bool) -> bool {
		let Some(panel) = self.panel() else {
			return false;
		};
		if index >= self.page_count() {
			debug!(index, pages = self.page_count(), "jump out of range ignored");
			return false;
		}
		scene.scroll_to_x(panel, slot_x(index, self.config.page_gap), animated);
		true
	}

	/// Tears the nodes down and hands back what should outlive the view.
	pub fn destroy(&mut self, scene: &mut dyn Scene) -> LaunchHistory {
		if let Some(nodes) = self.nodes.take() {
			for node in nodes.dots.into_iter().chain([nodes.prev, nodes.next, nodes.panel]) {
				scene.destroy_node(node);
			}
		}
		self.entrance = None;
		self.pending = None;
		self.history
	}

	pub fn state(&self) -> ViewState {
		self.state
	}
	pub fn page_index(&self) -> Option<usize> {
		self.page
	}
	pub fn page_count(&self) -> usize {
		self.nodes.as_ref().map_or(0, |n| n.slots.len())
	}
	pub fn pending_selection(&self) -> Option<AppId> {
		self.pending
	}
	pub fn history(&self) -> LaunchHistory {
		self.history
	}
	pub fn background(&self) -> &AnimatedColor {
		&self.background
	}
	pub fn panel(&self) -> Option<NodeId> {
		self.nodes.as_ref().map(|n| n.panel)
	}
	pub fn icon_node(&self, index: usize) -> Option<NodeId> {
		self.slot(index).map(|s| s.icon)
	}
	pub fn label_node(&self, index: usize) -> Option<NodeId> {
		self.slot(index).map(|s| s.label)
	}
	pub fn dot_node(&self, index: usize) -> Option<NodeId> {
		self.nodes.as_ref()?.dots.get(index).copied()
	}
	/// Previous and next page affordances.
	pub fn indicator_nodes(&self) -> Option<(NodeId, NodeId)> {
		self.nodes.as_ref().map(|n| (n.prev, n.next))
	}

	fn slot(&self, index: usize) -> Option<&Slot> {
		self.nodes.as_ref()?.slots.get(index)
	}

	fn update_entrance(&mut self, scene: &mut dyn Scene, dt: f32) {
		let (Some(entrance), Some(panel)) = (&mut self.entrance, self.nodes.as_ref().map(|n| n.panel)) else {
			self.state = ViewState::Normal;
			return;
		};
		let offset = entrance.offset.step(dt);
		let radius = entrance.radius.step(dt);
		scene.set_position(panel, 0.0, offset);
		scene.set_radius(panel, radius);

		if entrance.offset.is_done() && entrance.radius.is_done() {
			info!("entrance animation finished");
			self.entrance = None;
			self.state = ViewState::Normal;
		}
	}

	fn update_derived(&mut self, scene: &mut dyn Scene, dt: f64) {
		let Some(panel) = self.panel() else {
			return;
		};
		let scroll = scene.scroll_x(panel);
		if self.page_count() > 0 {
			let page = page_index(scroll, self.config.page_gap, self.page_count());
			if self.page != Some(page) {
				if let Some(theme) = self.slot(page).map(|s| s.theme) {
					self.background.retarget(theme);
				}
				self.show_page(scene, page);
			}
		}
		let color = self.background.advance(dt);
		scene.set_bg_color(panel, color);
		self.apply_edge_fade(scene, scroll);
		trace!(scroll, page = ?self.page, %color, "derived state");
	}

	fn show_page(&mut self, scene: &mut dyn Scene, page: usize) {
		debug!(page, previous = ?self.page, "page changed");
		self.page = Some(page);
		let Some(nodes) = &self.nodes else {
			return;
		};
		let config = &self.config;
		for (i, dot) in nodes.dots.iter().enumerate() {
			let (size, opacity) = if i == page {
				(config.dot_size_active, 1.0)
			} else {
				(config.dot_size, config.dot_opacity)
			};
			scene.set_size(*dot, size, size);
			scene.set_opacity(*dot, opacity);
		}
	}

	fn apply_edge_fade(&self, scene: &mut dyn Scene, scroll: f32) {
		let Some(nodes) = &self.nodes else {
			return;
		};
		let fade = edge_fade(
			scroll,
			self.config.page_gap,
			nodes.slots.len(),
			self.config.indicator_opacity_low,
			self.config.indicator_opacity_high,
		);
		scene.set_opacity(nodes.prev, fade.left);
		scene.set_opacity(nodes.next, fade.right);
	}
}
