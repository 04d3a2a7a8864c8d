use glam::Vec2;
use rustc_hash::FxHashMap;
use shell::{NodeId, NodeKind, Rgb, Scene, TouchState};
use std::collections::VecDeque;
use tracing::trace;
use tween::{QuartInOut, Tweener};

/// Pointer travel below which a press-release counts as a tap.
const TAP_SLOP: f32 = 8.0;
const SCROLL_ANIM_SECS: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct Node {
	pub parent: Option<NodeId>,
	pub kind: NodeKind,
	pub pos: Vec2,
	pub size: Vec2,
	pub radius: f32,
	pub opacity: f32,
	pub bg_color: Option<Rgb>,
	pub clickable: bool,
	pub scroll_x: f32,
	pub snap_x: Option<f32>,
	scroll_anim: Option<Tweener<f32, f64, QuartInOut>>,
}
impl Node {
	fn new(parent: Option<NodeId>, kind: NodeKind) -> Self {
		Node {
			parent,
			kind,
			pos: Vec2::ZERO,
			size: Vec2::ZERO,
			radius: 0.0,
			opacity: 1.0,
			bg_color: None,
			clickable: false,
			scroll_x: 0.0,
			snap_x: None,
			scroll_anim: None,
		}
	}
	pub fn is_scrolling(&self) -> bool {
		self.scroll_anim.is_some()
	}
}

#[derive(Debug, Clone, Copy)]
enum Pointer {
	Released,
	Pressed {
		start: Vec2,
		target: Option<NodeId>,
		scroller: Option<(NodeId, f32)>,
		dragging: bool,
	},
}

/// In-memory scene: keeps node properties, turns touch samples into taps
/// and drags, and animates scrolls. Stands in for the display backend in
/// the simulator and in tests.
#[derive(Debug)]
pub struct HeadlessScene {
	size: Vec2,
	nodes: FxHashMap<NodeId, Node>,
	order: Vec<NodeId>,
	next_id: u32,
	clicks: VecDeque<NodeId>,
	pointer: Pointer,
}
impl HeadlessScene {
	pub fn new(width: f32, height: f32) -> Self {
		HeadlessScene {
			size: Vec2::new(width, height),
			nodes: FxHashMap::default(),
			order: Vec::new(),
			next_id: 1,
			clicks: VecDeque::new(),
			pointer: Pointer::Released,
		}
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(&id)
	}
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}
	pub fn children(&self, parent: Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
		self.order
			.iter()
			.copied()
			.filter(move |id| self.nodes.get(id).is_some_and(|n| n.parent == parent))
	}

	/// Queues a click as if the node had been tapped.
	pub fn click(&mut self, node: NodeId) {
		if self.nodes.get(&node).is_some_and(|n| n.clickable) {
			self.clicks.push_back(node);
		}
	}

	/// Center of the node in screen coordinates.
	pub fn screen_center(&self, id: NodeId) -> Option<Vec2> {
		let node = self.nodes.get(&id)?;
		let origin = match node.parent {
			Some(parent) => {
				let scroll = self.nodes.get(&parent)?.scroll_x;
				self.screen_center(parent)? - Vec2::new(scroll, 0.0)
			}
			None => self.size / 2.0,
		};
		Some(origin + node.pos)
	}

	/// Topmost node under the point; later nodes draw over earlier ones.
	pub fn hit_test(&self, point: Vec2) -> Option<NodeId> {
		self.order.iter().rev().copied().find(|&id| {
			let (Some(node), Some(center)) = (self.nodes.get(&id), self.screen_center(id)) else {
				return false;
			};
			let half = node.size / 2.0;
			node.opacity > 0.0
				&& (point.x - center.x).abs() <= half.x
				&& (point.y - center.y).abs() <= half.y
		})
	}

	fn ancestor_where(&self, from: Option<NodeId>, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
		let mut current = from;
		while let Some(id) = current {
			let node = self.nodes.get(&id)?;
			if pred(node) {
				return Some(id);
			}
			current = node.parent;
		}
		None
	}

	/// Feeds one per-frame touch sample.
	pub fn feed_touch(&mut self, touch: TouchState) {
		let point = Vec2::new(touch.x as f32, touch.y as f32);
		self.pointer = match (self.pointer, touch.is_pressed()) {
			(Pointer::Released, false) => Pointer::Released,
			(Pointer::Released, true) => {
				let hit = self.hit_test(point);
				let target = self.ancestor_where(hit, |n| n.clickable);
				let scroller = self
					.ancestor_where(hit, |n| n.snap_x.is_some())
					.and_then(|id| Some((id, self.nodes.get(&id)?.scroll_x)));
				trace!(?point, ?target, "press");
				Pointer::Pressed {
					start: point,
					target,
					scroller,
					dragging: false,
				}
			}
			(
				Pointer::Pressed {
					start,
					target,
					scroller,
					dragging,
				},
				true,
			) => {
				let dx = point.x - start.x;
				let dragging = dragging || dx.abs() > TAP_SLOP;
				if dragging {
					if let Some((id, origin)) = scroller {
						if let Some(node) = self.nodes.get_mut(&id) {
							node.scroll_anim = None;
							node.scroll_x = origin - dx;
						}
					}
				}
				Pointer::Pressed {
					start,
					target,
					scroller,
					dragging,
				}
			}
			(
				Pointer::Pressed {
					target,
					scroller,
					dragging,
					..
				},
				false,
			) => {
				if dragging {
					if let Some((id, _)) = scroller {
						self.settle(id);
					}
				} else if let Some(target) = target {
					trace!(%target, "tap");
					self.clicks.push_back(target);
				}
				Pointer::Released
			}
		};
	}

	/// Snaps a scroller to its nearest step inside its content.
	fn settle(&mut self, id: NodeId) {
		let max = self
			.children(Some(id))
			.filter_map(|child| self.nodes.get(&child))
			.map(|child| child.pos.x)
			.fold(0.0f32, f32::max);
		let Some(node) = self.nodes.get(&id) else {
			return;
		};
		let Some(step) = node.snap_x.filter(|s| *s > 0.0) else {
			return;
		};
		let snapped = ((node.scroll_x / step).round() * step).clamp(0.0, max);
		self.scroll_to_x(id, snapped, true);
	}

	/// Advances scroll animations by one frame.
	pub fn advance(&mut self, dt_secs: f64) {
		for node in self.nodes.values_mut() {
			if let Some(anim) = &mut node.scroll_anim {
				node.scroll_x = anim.move_by(dt_secs);
				if anim.is_finished() {
					node.scroll_x = anim.final_value();
					node.scroll_anim = None;
				}
			}
		}
	}

	fn with_node(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) {
		if let Some(node) = self.nodes.get_mut(&id) {
			f(node);
		} else {
			trace!(%id, "update of destroyed node ignored");
		}
	}
}

impl Scene for HeadlessScene {
	fn create_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
		let id = NodeId(self.next_id);
		self.next_id += 1;
		self.nodes.insert(id, Node::new(parent, kind));
		self.order.push(id);
		id
	}

	fn destroy_node(&mut self, node: NodeId) {
		let children: Vec<_> = self.children(Some(node)).collect();
		for child in children {
			self.destroy_node(child);
		}
		self.nodes.remove(&node);
		self.order.retain(|id| *id != node);
		self.clicks.retain(|id| *id != node);
	}

	fn set_position(&mut self, node: NodeId, x: f32, y: f32) {
		self.with_node(node, |n| n.pos = Vec2::new(x, y));
	}
	fn set_size(&mut self, node: NodeId, width: f32, height: f32) {
		self.with_node(node, |n| n.size = Vec2::new(width, height));
	}
	fn set_radius(&mut self, node: NodeId, radius: f32) {
		self.with_node(node, |n| n.radius = radius);
	}
	fn set_opacity(&mut self, node: NodeId, opacity: f32) {
		self.with_node(node, |n| n.opacity = opacity.clamp(0.0, 1.0));
	}
	fn set_bg_color(&mut self, node: NodeId, color: Rgb) {
		self.with_node(node, |n| n.bg_color = Some(color));
	}
	fn set_clickable(&mut self, node: NodeId, clickable: bool) {
		self.with_node(node, |n| n.clickable = clickable);
	}
	fn poll_click(&mut self) -> Option<NodeId> {
		self.clicks.pop_front()
	}

	fn scroll_x(&self, node: NodeId) -> f32 {
		self.nodes.get(&node).map(|n| n.scroll_x).unwrap_or_default()
	}
	fn scroll_to_x(&mut self, node: NodeId, x: f32, animated: bool) {
		self.with_node(node, |n| {
			if animated && n.scroll_x != x {
				n.scroll_anim = Some(Tweener::quart_in_out(n.scroll_x, x, SCROLL_ANIM_SECS));
			} else {
				n.scroll_anim = None;
				n.scroll_x = x;
			}
		});
	}
	fn set_scroll_snap_x(&mut self, node: NodeId, step: Option<f32>) {
		self.with_node(node, |n| n.snap_x = step);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// 320x240 screen with a snapping panel holding three 160px icons.
	fn pager() -> (HeadlessScene, NodeId, Vec<NodeId>) {
		let mut scene = HeadlessScene::new(320.0, 240.0);
		let panel = scene.create_node(None, NodeKind::Container);
		scene.set_size(panel, 320.0, 240.0);
		scene.set_scroll_snap_x(panel, Some(320.0));
		let icons = (0..3)
			.map(|i| {
				let icon = scene.create_node(Some(panel), NodeKind::Container);
				scene.set_position(icon, i as f32 * 320.0, -10.0);
				scene.set_size(icon, 160.0, 160.0);
				scene.set_clickable(icon, true);
				icon
			})
			.collect();
		(scene, panel, icons)
	}

	fn drag(scene: &mut HeadlessScene, from: (i32, i32), to: (i32, i32)) {
		let steps = 8;
		for i in 0..=steps {
			let x = from.0 + (to.0 - from.0) * i / steps;
			let y = from.1 + (to.1 - from.1) * i / steps;
			scene.feed_touch(TouchState::pressed(x, y));
		}
		scene.feed_touch(TouchState::RELEASED);
	}

	fn settle(scene: &mut HeadlessScene) {
		for _ in 0..60 {
			scene.advance(0.01);
		}
	}

	#[test]
	fn tap_clicks_the_icon_under_the_finger() {
		let (mut scene, _, icons) = pager();
		scene.feed_touch(TouchState::pressed(160, 110));
		scene.feed_touch(TouchState::pressed(162, 111));
		scene.feed_touch(TouchState::RELEASED);
		assert_eq!(scene.poll_click(), Some(icons[0]));
		assert_eq!(scene.poll_click(), None);
	}

	#[test]
	fn tap_on_the_panel_background_clicks_nothing() {
		let (mut scene, _, _) = pager();
		scene.feed_touch(TouchState::pressed(10, 230));
		scene.feed_touch(TouchState::RELEASED);
		assert_eq!(scene.poll_click(), None);
	}

	#[test]
	fn drag_scrolls_then_snaps_to_the_next_page() {
		let (mut scene, panel, icons) = pager();
		drag(&mut scene, (260, 110), (60, 110));
		assert_eq!(scene.poll_click(), None);
		assert!(scene.node(panel).unwrap().is_scrolling());
		settle(&mut scene);
		assert_eq!(scene.scroll_x(panel), 320.0);
		assert_eq!(scene.screen_center(icons[1]), Some(Vec2::new(160.0, 110.0)));
	}

	#[test]
	fn snap_stays_inside_the_content() {
		let (mut scene, panel, _) = pager();
		drag(&mut scene, (300, 110), (100, 110));
		settle(&mut scene);
		drag(&mut scene, (300, 110), (100, 110));
		settle(&mut scene);
		drag(&mut scene, (300, 110), (0, 110));
		settle(&mut scene);
		assert_eq!(scene.scroll_x(panel), 640.0);

		drag(&mut scene, (0, 110), (319, 110));
		drag(&mut scene, (0, 110), (319, 110));
		drag(&mut scene, (0, 110), (319, 110));
		settle(&mut scene);
		assert_eq!(scene.scroll_x(panel), 0.0);
	}

	#[test]
	fn instant_scroll_and_destroy() {
		let (mut scene, panel, icons) = pager();
		scene.scroll_to_x(panel, 640.0, false);
		assert_eq!(scene.scroll_x(panel), 640.0);
		assert_eq!(scene.hit_test(Vec2::new(160.0, 110.0)), Some(icons[2]));

		scene.click(icons[2]);
		scene.destroy_node(panel);
		assert_eq!(scene.node_count(), 0);
		assert_eq!(scene.poll_click(), None);
	}
}
