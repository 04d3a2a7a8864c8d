use crate::application::{IconRef, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);
impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node{}", self.0)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Container,
	Label(String),
	Image(IconRef),
}

/// The slice of the rendering backend the shell drives.
///
/// Positions are offsets of a node's center from its parent's center, in
/// device length units; a parent's horizontal scroll shifts its children.
/// Every call must happen under the render lock.
pub trait Scene: Send {
	/// `None` parents the node to the screen.
	fn create_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId;
	/// Destroys the node and everything below it.
	fn destroy_node(&mut self, node: NodeId);

	fn set_position(&mut self, node: NodeId, x: f32, y: f32);
	fn set_size(&mut self, node: NodeId, width: f32, height: f32);
	fn set_radius(&mut self, node: NodeId, radius: f32);
	fn set_opacity(&mut self, node: NodeId, opacity: f32);
	fn set_bg_color(&mut self, node: NodeId, color: Rgb);

	/// Subscribes the node to clicks; they come back through [`Scene::poll_click`].
	fn set_clickable(&mut self, node: NodeId, clickable: bool);
	fn poll_click(&mut self) -> Option<NodeId>;

	fn scroll_x(&self, node: NodeId) -> f32;
	fn scroll_to_x(&mut self, node: NodeId, x: f32, animated: bool);
	/// Snap the horizontal scroll to multiples of `step` when a drag ends.
	fn set_scroll_snap_x(&mut self, _node: NodeId, _step: Option<f32>) {}
}
