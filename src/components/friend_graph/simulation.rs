//! Force-directed layout over the derived friend graph.
//!
//! A velocity-Verlet simulation with an exponentially cooling `alpha`. Every
//! call to [`ForceSimulation::tick`] advances one step; the canvas calls it
//! once per animation frame. The simulation is the only writer of node
//! positions and pins.
//!
//! Isolated nodes (no edges under the current filter) get a weaker charge, a
//! pull toward the connected cluster and a pull toward nearby isolated nodes,
//! so they gather next to the graph instead of drifting off.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use log::{debug, warn};

use super::derive::isolated_ids;
use super::forces::{
	CenterForce, CentroidCohesion, ChargeForce, CollideForce, Force, IsolatedAttraction, LinkForce,
};
use super::types::{GraphEdge, GraphNode};

/// Spacing of the initial phyllotaxis spiral.
const INITIAL_RADIUS: f64 = 10.0;

/// Golden angle, gives an even spiral without clumping.
fn initial_angle() -> f64 {
	PI * (3.0 - 5f64.sqrt())
}

/// Simple pseudo-random function (deterministic), in `[0, 1)`.
pub(crate) fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// Tunables for the layout. Defaults give a readable social graph at 25–60px radii.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
	/// Simulation halts once alpha drops below this.
	pub alpha_min: f64,
	/// Fraction of the gap to `alpha_target` closed per tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick (friction).
	pub velocity_decay: f64,
	/// Link rest length for a single shared event.
	pub link_distance: f64,
	/// Rest length lost per additional shared event.
	pub link_distance_step: f64,
	pub link_distance_min: f64,
	pub link_strength_base: f64,
	pub link_strength_step: f64,
	/// Cap on spring stiffness; higher values oscillate.
	pub link_strength_max: f64,
	pub charge_base: f64,
	/// Extra charge per pixel of radius, so bigger nodes push harder.
	pub charge_per_radius: f64,
	/// Multiplier on the charge of isolated nodes.
	pub isolated_charge_factor: f64,
	pub charge_distance_min: f64,
	pub center_x: f64,
	pub center_y: f64,
	pub center_strength: f64,
	/// Added to each node radius for collision.
	pub collision_padding: f64,
	pub collision_strength: f64,
	pub collision_iterations: usize,
	/// Pull of isolated nodes toward the connected centroid.
	pub cohesion_strength: f64,
	pub isolated_attraction_strength: f64,
	/// Isolated nodes further apart than this do not attract.
	pub isolated_attraction_distance: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Starting alpha when positions are carried over from a previous layout.
	pub reheat_alpha: f64,
	/// Varies the jitter on initial placement.
	pub seed: u64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			link_distance: 150.0,
			link_distance_step: 10.0,
			link_distance_min: 40.0,
			link_strength_base: 0.1,
			link_strength_step: 0.1,
			link_strength_max: 0.7,
			charge_base: -100.0,
			charge_per_radius: -10.0,
			isolated_charge_factor: 0.3,
			charge_distance_min: 1.0,
			center_x: 0.0,
			center_y: 0.0,
			center_strength: 1.0,
			collision_padding: 5.0,
			collision_strength: 0.7,
			collision_iterations: 1,
			cohesion_strength: 0.02,
			isolated_attraction_strength: 0.005,
			isolated_attraction_distance: 150.0,
			drag_alpha_target: 0.3,
			reheat_alpha: 0.3,
			seed: 0,
		}
	}
}

impl ForceConfig {
	/// Rest length shrinks as friends share more events.
	pub fn link_distance(&self, value: usize) -> f64 {
		let steps = value.saturating_sub(1) as f64;
		(self.link_distance - steps * self.link_distance_step).max(self.link_distance_min)
	}

	/// Stiffness grows with shared events, capped at `link_strength_max`.
	pub fn link_strength(&self, value: usize) -> f64 {
		(self.link_strength_base + value as f64 * self.link_strength_step).min(self.link_strength_max)
	}

	pub fn charge(&self, radius: f64, isolated: bool) -> f64 {
		let charge = self.charge_base + radius * self.charge_per_radius;
		if isolated {
			charge * self.isolated_charge_factor
		} else {
			charge
		}
	}

	fn initial_position(&self, index: usize) -> (f64, f64) {
		let i = index as f64;
		let seed = self.seed as f64;
		let radius = INITIAL_RADIUS * (0.5 + i).sqrt();
		let angle = i * initial_angle() + pseudo_random(seed * 7.13 + 0.37) * 2.0 * PI;
		let jitter_x = (pseudo_random(seed * 3.1 + i * 1.3 + 0.11) - 0.5) * INITIAL_RADIUS;
		let jitter_y = (pseudo_random(seed * 5.7 + i * 2.9 + 0.23) - 0.5) * INITIAL_RADIUS;
		(
			radius * angle.cos() + jitter_x + self.center_x,
			radius * angle.sin() + jitter_y + self.center_y,
		)
	}
}

/// A graph node as seen by the simulation.
#[derive(Clone, Debug)]
pub struct SimNode {
	pub data: Arc<GraphNode>,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x; while set, `x` snaps to it every tick.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	/// No incident edges under the current filter.
	pub isolated: bool,
}

impl SimNode {
	pub fn new(data: Arc<GraphNode>, x: f64, y: f64, isolated: bool) -> Self {
		Self {
			data,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			isolated,
		}
	}

	pub fn id(&self) -> &str {
		&self.data.id
	}

	pub fn radius(&self) -> f64 {
		self.data.radius
	}

	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// A spring between two node indices.
#[derive(Clone, Debug)]
pub struct SimLink {
	pub source: usize,
	pub target: usize,
	pub distance: f64,
	pub strength: f64,
	/// Share of the correction applied to the target; the rest goes to the source.
	pub bias: f64,
}

impl SimLink {
	pub fn new(source: usize, target: usize, distance: f64, strength: f64, bias: f64) -> Self {
		Self {
			source,
			target,
			distance,
			strength,
			bias,
		}
	}
}

type TickCallback = Box<dyn FnMut(&[SimNode])>;

/// A running layout over one derivation of nodes and edges.
///
/// Build a new simulation whenever the derived graph changes, carry positions
/// over with [`inherit_positions`](Self::inherit_positions), and [`stop`](Self::stop)
/// the old one.
pub struct ForceSimulation {
	nodes: Vec<SimNode>,
	edges: Vec<(GraphEdge, usize, usize)>,
	index: HashMap<String, usize>,
	forces: Vec<Box<dyn Force>>,
	config: ForceConfig,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	ticks: usize,
	on_tick: Option<TickCallback>,
}

impl ForceSimulation {
	pub fn new(nodes: &[Arc<GraphNode>], edges: &[GraphEdge], config: ForceConfig) -> Self {
		let isolated = isolated_ids(nodes, edges);
		let sim_nodes: Vec<SimNode> = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let (x, y) = config.initial_position(i);
				SimNode::new(Arc::clone(node), x, y, isolated.contains(node.id.as_str()))
			})
			.collect();
		let index: HashMap<String, usize> = sim_nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id().to_string(), i))
			.collect();

		let mut degree = vec![0usize; sim_nodes.len()];
		let mut resolved = Vec::with_capacity(edges.len());
		for edge in edges {
			match (index.get(&edge.source.id), index.get(&edge.target.id)) {
				(Some(&s), Some(&t)) if s != t => {
					degree[s] += 1;
					degree[t] += 1;
					resolved.push((edge.clone(), s, t));
				}
				_ => warn!("friend-graph: skipping edge {} with unknown endpoint", edge.key()),
			}
		}

		let links = resolved
			.iter()
			.map(|(edge, s, t)| {
				let bias = degree[*s] as f64 / (degree[*s] + degree[*t]) as f64;
				SimLink::new(
					*s,
					*t,
					config.link_distance(edge.value()),
					config.link_strength(edge.value()),
					bias,
				)
			})
			.collect();
		let charges = sim_nodes
			.iter()
			.map(|n| config.charge(n.radius(), n.isolated))
			.collect();
		let radii = sim_nodes
			.iter()
			.map(|n| n.radius() + config.collision_padding)
			.collect();

		let forces: Vec<Box<dyn Force>> = vec![
			Box::new(LinkForce::new(links)),
			Box::new(ChargeForce::new(charges, config.charge_distance_min)),
			Box::new(CenterForce::new(
				config.center_x,
				config.center_y,
				config.center_strength,
			)),
			Box::new(CollideForce::new(
				radii,
				config.collision_strength,
				config.collision_iterations,
			)),
			Box::new(CentroidCohesion::new(config.cohesion_strength)),
			Box::new(IsolatedAttraction::new(
				config.isolated_attraction_strength,
				config.isolated_attraction_distance,
			)),
		];

		let running = !sim_nodes.is_empty();
		Self {
			nodes: sim_nodes,
			edges: resolved,
			index,
			forces,
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			running,
			ticks: 0,
			on_tick: None,
		}
	}

	/// Copies position, velocity and pins from `previous` for every node id
	/// present in both. Returns how many nodes were carried over. When any
	/// were, alpha restarts at `reheat_alpha` so the layout adjusts gently.
	pub fn inherit_positions(&mut self, previous: &ForceSimulation) -> usize {
		let mut carried = 0;
		for node in &mut self.nodes {
			if let Some(old) = previous.node(node.id()) {
				node.x = old.x;
				node.y = old.y;
				node.vx = old.vx;
				node.vy = old.vy;
				node.fx = old.fx;
				node.fy = old.fy;
				carried += 1;
			}
		}
		if carried > 0 {
			self.alpha = self.config.reheat_alpha;
			self.alpha_target = previous.alpha_target;
		}
		carried
	}

	/// Registers the consumer notified after every tick.
	pub fn on_tick(&mut self, callback: impl FnMut(&[SimNode]) + 'static) {
		self.on_tick = Some(Box::new(callback));
	}

	/// Advances one step. Returns `false` without doing anything when the
	/// simulation is stopped, settled or empty.
	pub fn tick(&mut self) -> bool {
		if !self.running || self.nodes.is_empty() {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		for force in &mut self.forces {
			force.apply(&mut self.nodes, self.alpha);
		}

		let friction = 1.0 - self.config.velocity_decay;
		for (i, node) in self.nodes.iter_mut().enumerate() {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= friction;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= friction;
					node.y += node.vy;
				}
			}
			if !(node.x.is_finite() && node.y.is_finite()) {
				warn!("friend-graph: resetting diverged node {}", node.id());
				(node.x, node.y) = self.config.initial_position(i);
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}

		self.ticks += 1;
		if let Some(callback) = self.on_tick.as_mut() {
			callback(&self.nodes);
		}

		if self.alpha < self.config.alpha_min {
			self.running = false;
			debug!("friend-graph: layout settled after {} ticks", self.ticks);
		}
		true
	}

	/// Ticks until settled or `max_ticks` is reached. Returns ticks taken.
	pub fn settle(&mut self, max_ticks: usize) -> usize {
		let mut taken = 0;
		while taken < max_ticks && self.tick() {
			taken += 1;
		}
		taken
	}

	/// Halts the simulation and releases the tick callback.
	pub fn stop(&mut self) {
		self.running = false;
		self.on_tick = None;
	}

	/// Resumes ticking without resetting alpha.
	pub fn restart(&mut self) {
		self.running = !self.nodes.is_empty();
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn config(&self) -> &ForceConfig {
		&self.config
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Every edge with its resolved endpoints.
	pub fn edge_endpoints(&self) -> impl Iterator<Item = (&GraphEdge, &SimNode, &SimNode)> {
		self.edges
			.iter()
			.map(|(edge, s, t)| (edge, &self.nodes[*s], &self.nodes[*t]))
	}

	/// Pins `id` where it is and keeps the rest of the graph warm.
	pub fn drag_start(&mut self, id: &str) -> bool {
		let Some(&i) = self.index.get(id) else {
			return false;
		};
		let node = &mut self.nodes[i];
		node.fx = Some(node.x);
		node.fy = Some(node.y);
		self.alpha_target = self.config.drag_alpha_target;
		self.restart();
		true
	}

	/// Moves the pin of a dragged node.
	pub fn drag_to(&mut self, id: &str, x: f64, y: f64) {
		if let Some(&i) = self.index.get(id) {
			self.nodes[i].fx = Some(x);
			self.nodes[i].fy = Some(y);
		}
	}

	/// Unpins `id` and lets the layout cool down.
	pub fn drag_end(&mut self, id: &str) {
		if let Some(&i) = self.index.get(id) {
			self.nodes[i].fx = None;
			self.nodes[i].fy = None;
		}
		self.alpha_target = 0.0;
	}
}
