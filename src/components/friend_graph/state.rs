//! Canvas interaction state.
//!
//! Wraps the running [`ForceSimulation`] with the view transform for pan/zoom,
//! drag and pan gestures, hover highlight intensities and hit testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::info;

use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::{ForceConfig, ForceSimulation};
use super::types::{EdgeKey, GraphEdge, GraphNode};

/// Pointer travel (screen pixels) below which a press/release counts as a click.
pub const CLICK_SLOP: f64 = 3.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl ViewTransform {
	/// Graph origin at the center of a `width` × `height` viewport, unzoomed.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Zooms to `k` keeping the graph point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, k: f64) {
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}
}

/// An in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Pointer left the click slop.
	pub moved: bool,
}

/// An in-progress pan, or a press on an edge that may turn into a click.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
	/// Edge under the pointer when the press started.
	pub edge: Option<EdgeKey>,
}

/// What a released press resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum Release {
	NodeClick(String),
	EdgeClick(EdgeKey),
	None,
}

/// Manages smooth highlight transitions with per-node intensity tracking.
///
/// Each node has its own intensity value (0.0 to 1.0) that eases toward 1
/// while it is hovered or next to the hovered node, and back to 0 afterwards.
/// A minimum hold time prevents flashing when the mouse briefly skirts a node.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered_node: Option<String>,
	target_set: HashSet<String>,
	node_intensity: HashMap<String, f64>,
	hover_ring_intensity: HashMap<String, f64>,
	hold_timer: HashMap<String, f64>,
	cached_max: f64,
}

/// Minimum time (seconds) a highlight must be held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;

impl HighlightState {
	/// Update the hovered node and recompute the target highlight set.
	pub fn set_hover<'a>(&mut self, node: Option<&str>, edges: impl IntoIterator<Item = &'a GraphEdge>) {
		if self.hovered_node.as_deref() == node {
			return;
		}

		self.hovered_node = node.map(str::to_string);
		self.target_set.clear();

		if let Some(id) = node {
			self.target_set.insert(id.to_string());
			for edge in edges {
				if let Some(other) = edge.other_end(id) {
					self.target_set.insert(other.id.clone());
				}
			}
			for id in &self.target_set {
				self.hold_timer.insert(id.clone(), MIN_HOLD_TIME);
			}
		}
	}

	pub fn hovered_node(&self) -> Option<&str> {
		self.hovered_node.as_deref()
	}

	/// Animate all intensities towards their targets using exponential smoothing.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0; // ~150ms to 95%
		const FADE_OUT_SPEED: f64 = 4.0; // ~250ms to 95%

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();

		for id in &self.target_set {
			let intensity = self.node_intensity.entry(id.clone()).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}
		if let Some(id) = &self.hovered_node {
			let intensity = self.hover_ring_intensity.entry(id.clone()).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}

		let target_set = &self.target_set;
		self.hold_timer.retain(|id, timer| {
			if target_set.contains(id) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		let hold_timer = &self.hold_timer;
		let mut new_max: f64 = 0.0;
		self.node_intensity.retain(|id, intensity| {
			if !target_set.contains(id) && hold_timer.get(id).copied().unwrap_or(0.0) <= 0.0 {
				*intensity *= fade_out_decay;
			}
			new_max = new_max.max(*intensity);
			target_set.contains(id) || *intensity > 0.005
		});

		let hovered = self.hovered_node.as_deref();
		self.hover_ring_intensity.retain(|id, intensity| {
			if hovered == Some(id.as_str()) {
				return true;
			}
			if hold_timer.get(id).copied().unwrap_or(0.0) <= 0.0 {
				*intensity *= fade_out_decay;
			}
			*intensity > 0.005
		});

		self.cached_max = new_max;
	}

	pub fn node_intensity(&self, id: &str) -> f64 {
		self.node_intensity.get(id).copied().unwrap_or(0.0)
	}

	pub fn hover_ring_intensity(&self, id: &str) -> f64 {
		self.hover_ring_intensity.get(id).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoint intensities.
	pub fn edge_intensity(&self, a: &str, b: &str) -> f64 {
		(self.node_intensity(a) * self.node_intensity(b)).sqrt()
	}

	/// Highest node intensity, used to dim everything else.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// Selected ids as last published by the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionView {
	pub node: Option<String>,
	pub link: Option<EdgeKey>,
}

impl SelectionView {
	pub fn is_node_selected(&self, id: &str) -> bool {
		self.node.as_deref() == Some(id)
	}

	pub fn is_link_selected(&self, key: &EdgeKey) -> bool {
		self.link.as_ref() == Some(key)
	}

	/// Edge touches the selected node.
	pub fn is_incident(&self, key: &EdgeKey) -> bool {
		self.node.as_deref().is_some_and(|id| key.contains(id))
	}
}

/// Everything the canvas mutates between frames.
pub struct CanvasState {
	pub simulation: ForceSimulation,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub hovered_edge: Option<EdgeKey>,
	pub selection: SelectionView,
	pub width: f64,
	pub height: f64,
	forces: ForceConfig,
}

impl CanvasState {
	pub fn new(
		nodes: &[Arc<GraphNode>],
		edges: &[GraphEdge],
		forces: ForceConfig,
		width: f64,
		height: f64,
	) -> Self {
		Self {
			simulation: ForceSimulation::new(nodes, edges, forces.clone()),
			transform: ViewTransform::centered(width, height),
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			hovered_edge: None,
			selection: SelectionView::default(),
			width,
			height,
			forces,
		}
	}

	/// Swaps in a simulation over a new derivation. The old one is stopped
	/// first; surviving nodes keep their positions.
	pub fn rebuild(&mut self, nodes: &[Arc<GraphNode>], edges: &[GraphEdge]) {
		self.simulation.stop();
		let mut next = ForceSimulation::new(nodes, edges, self.forces.clone());
		let carried = next.inherit_positions(&self.simulation);
		info!(
			"friend-graph: layout rebuilt with {} nodes, {} edges ({} carried over)",
			nodes.len(),
			edges.len(),
			carried
		);

		if let Some(id) = self.drag.node.as_deref() {
			if next.node(id).is_some() {
				next.drag_start(id);
			} else {
				next.drag_end(id);
				self.drag = DragState::default();
			}
		}
		self.simulation = next;

		let hovered = self
			.highlight
			.hovered_node()
			.filter(|id| self.simulation.node(id).is_some())
			.map(str::to_string);
		self.highlight = HighlightState::default();
		self.set_hover(hovered.as_deref());
		if self
			.hovered_edge
			.as_ref()
			.is_some_and(|key| !self.simulation.edge_endpoints().any(|(e, _, _)| e.key() == key))
		{
			self.hovered_edge = None;
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.screen_to_graph(sx, sy)
	}

	/// Topmost node under the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		self.simulation
			.nodes()
			.iter()
			.rev()
			.find(|node| {
				let (dx, dy) = (node.x - gx, node.y - gy);
				(dx * dx + dy * dy).sqrt() <= node.radius() + scale.hit_padding
			})
			.map(|node| node.id().to_string())
	}

	/// Closest edge within pick distance of the screen point.
	pub fn edge_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<EdgeKey> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		self.simulation
			.edge_endpoints()
			.map(|(edge, a, b)| {
				let reach = config.edge.highlighted_width(edge.value()) / 2.0 + scale.edge_hit_tolerance;
				(edge, point_segment_distance(gx, gy, a.x, a.y, b.x, b.y), reach)
			})
			.filter(|(_, distance, reach)| distance <= reach)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(edge, _, _)| edge.key().clone())
	}

	pub fn set_hover(&mut self, node: Option<&str>) {
		let edges = self.simulation.edge_endpoints().map(|(edge, _, _)| edge);
		self.highlight.set_hover(node, edges);
	}

	/// Starts a press at a screen point: a node drag if a node is hit,
	/// otherwise a pan that remembers the edge under the pointer.
	pub fn press(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		if let Some(id) = self.node_at_position(sx, sy, config) {
			if let Some(node) = self.simulation.node(&id) {
				self.drag = DragState {
					node_start_x: node.x,
					node_start_y: node.y,
					start_x: sx,
					start_y: sy,
					moved: false,
					node: None,
				};
			}
			self.simulation.drag_start(&id);
			self.drag.node = Some(id);
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
				edge: self.edge_at_position(sx, sy, config),
			};
		}
	}

	/// Pointer moved to a screen point.
	pub fn pointer_move(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		if let Some(id) = self.drag.node.clone() {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			self.drag.moved |= dx.hypot(dy) > CLICK_SLOP;
			let k = self.transform.k;
			self.simulation
				.drag_to(&id, self.drag.node_start_x + dx / k, self.drag.node_start_y + dy / k);
		} else if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			self.pan.moved |= dx.hypot(dy) > CLICK_SLOP;
			if self.pan.moved {
				self.transform.x = self.pan.transform_start_x + dx;
				self.transform.y = self.pan.transform_start_y + dy;
			}
		} else {
			let hovered = self.node_at_position(sx, sy, config);
			self.set_hover(hovered.as_deref());
			self.hovered_edge = match hovered {
				Some(_) => None,
				None => self.edge_at_position(sx, sy, config),
			};
		}
	}

	/// Ends the current press. Unpins a dragged node and reports a click if
	/// the pointer never left the click slop.
	pub fn release(&mut self) -> Release {
		let drag = std::mem::take(&mut self.drag);
		let pan = std::mem::take(&mut self.pan);
		if let Some(id) = drag.node {
			self.simulation.drag_end(&id);
			if !drag.moved {
				return Release::NodeClick(id);
			}
		} else if pan.active && !pan.moved {
			if let Some(key) = pan.edge {
				return Release::EdgeClick(key);
			}
		}
		Release::None
	}

	/// Pointer left the canvas: abandon gestures without clicking.
	pub fn cancel(&mut self) {
		if let Some(id) = self.drag.node.take() {
			self.simulation.drag_end(&id);
		}
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hovered_edge = None;
		self.set_hover(None);
	}

	/// Multiplies zoom by `factor` around a screen point, within limits.
	pub fn zoom_by(&mut self, sx: f64, sy: f64, factor: f64, config: &ScaleConfig) {
		let k = config.zoom.clamp(self.transform.k * factor);
		self.transform.zoom_at(sx, sy, k);
	}

	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::centered(self.width, self.height);
	}

	/// Advances the layout and highlight animation by one frame.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.tick();
		self.highlight.tick(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

/// Distance from `(px, py)` to the segment `(x1, y1)–(x2, y2)`.
pub fn point_segment_distance(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < f64::EPSILON {
		0.0
	} else {
		(((px - x1) * dx + (py - y1) * dy) / len2).clamp(0.0, 1.0)
	};
	(px - (x1 + t * dx)).hypot(py - (y1 + t * dy))
}
