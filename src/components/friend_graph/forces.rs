//! Forces applied by [`ForceSimulation`](super::simulation::ForceSimulation) on every tick.
//!
//! Each force reads node positions and adds to node velocities, scaled by the
//! current `alpha`. The center force is the exception and moves positions
//! directly. Pairwise forces are naive O(n²); a personal network stays well
//! below the size where a quadtree would pay off.

use super::simulation::{SimLink, SimNode};

/// A per-tick force. Implementors must never write NaN into a node.
pub trait Force {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64);
}

/// Tiny deterministic offset used when two points coincide, so the direction
/// of a force is defined and no division by zero occurs.
pub(crate) fn jiggle(salt: usize) -> f64 {
	let r = super::simulation::pseudo_random(salt as f64 + 0.5) - 0.5;
	if r == 0.0 { 1e-6 } else { r * 1e-6 }
}

/// Springs along edges. Rest length and stiffness come from the edge value.
pub struct LinkForce {
	links: Vec<SimLink>,
}

impl LinkForce {
	pub fn new(links: Vec<SimLink>) -> Self {
		Self { links }
	}
}

impl Force for LinkForce {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64) {
		for (k, link) in self.links.iter().enumerate() {
			let (s, t) = (&nodes[link.source], &nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = jiggle(k);
			}
			if y == 0.0 {
				y = jiggle(k + 1);
			}
			let l = (x * x + y * y).sqrt();
			let l = (l - link.distance) / l * alpha * link.strength;
			let (x, y) = (x * l, y * l);

			let target = &mut nodes[link.target];
			target.vx -= x * link.bias;
			target.vy -= y * link.bias;
			let source = &mut nodes[link.source];
			source.vx += x * (1.0 - link.bias);
			source.vy += y * (1.0 - link.bias);
		}
	}
}

/// All-pairs repulsion. `strengths[j]` is how hard node `j` pushes others
/// (negative values repel).
pub struct ChargeForce {
	strengths: Vec<f64>,
	distance_min2: f64,
}

impl ChargeForce {
	pub fn new(strengths: Vec<f64>, distance_min: f64) -> Self {
		Self {
			strengths,
			distance_min2: distance_min * distance_min,
		}
	}
}

impl Force for ChargeForce {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64) {
		let positions: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
		for (i, node) in nodes.iter_mut().enumerate() {
			let (xi, yi) = positions[i];
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for (j, &(xj, yj)) in positions.iter().enumerate() {
				if i == j {
					continue;
				}
				let (mut x, mut y) = (xj - xi, yj - yi);
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = jiggle(i * 31 + j);
					l += x * x;
				}
				if y == 0.0 {
					y = jiggle(j * 31 + i);
					l += y * y;
				}
				if l < self.distance_min2 {
					l = (self.distance_min2 * l).sqrt();
				}
				let w = self.strengths[j] * alpha / l;
				dvx += x * w;
				dvy += y * w;
			}
			node.vx += dvx;
			node.vy += dvy;
		}
	}
}

/// Translates the whole graph so its mean position sits on `(x, y)`.
pub struct CenterForce {
	x: f64,
	y: f64,
	strength: f64,
}

impl CenterForce {
	pub fn new(x: f64, y: f64, strength: f64) -> Self {
		Self { x, y, strength }
	}
}

impl Force for CenterForce {
	fn apply(&mut self, nodes: &mut [SimNode], _alpha: f64) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (
			(sx / n - self.x) * self.strength,
			(sy / n - self.y) * self.strength,
		);
		for node in nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}
}

/// Keeps circles from overlapping. Resolved as a positional constraint on the
/// predicted positions, not as a force with falloff.
pub struct CollideForce {
	radii: Vec<f64>,
	strength: f64,
	iterations: usize,
}

impl CollideForce {
	pub fn new(radii: Vec<f64>, strength: f64, iterations: usize) -> Self {
		Self {
			radii,
			strength,
			iterations: iterations.max(1),
		}
	}
}

impl Force for CollideForce {
	fn apply(&mut self, nodes: &mut [SimNode], _alpha: f64) {
		for _ in 0..self.iterations {
			for i in 0..nodes.len() {
				let ri = self.radii[i];
				let (xi, yi) = (nodes[i].x + nodes[i].vx, nodes[i].y + nodes[i].vy);
				for j in (i + 1)..nodes.len() {
					let rj = self.radii[j];
					let r = ri + rj;
					let mut x = xi - nodes[j].x - nodes[j].vx;
					let mut y = yi - nodes[j].y - nodes[j].vy;
					let mut l = x * x + y * y;
					if l >= r * r {
						continue;
					}
					if x == 0.0 {
						x = jiggle(i * 17 + j);
						l += x * x;
					}
					if y == 0.0 {
						y = jiggle(j * 17 + i);
						l += y * y;
					}
					let d = l.sqrt();
					let k = (r - d) / d * self.strength;
					let (x, y) = (x * k, y * k);
					let w = rj * rj / (ri * ri + rj * rj);
					nodes[i].vx += x * w;
					nodes[i].vy += y * w;
					nodes[j].vx -= x * (1.0 - w);
					nodes[j].vy -= y * (1.0 - w);
				}
			}
		}
	}
}

/// Nudges isolated nodes toward the centroid of the connected nodes.
pub struct CentroidCohesion {
	strength: f64,
}

impl CentroidCohesion {
	pub fn new(strength: f64) -> Self {
		Self { strength }
	}
}

impl Force for CentroidCohesion {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64) {
		let (mut cx, mut cy, mut count) = (0.0, 0.0, 0usize);
		for node in nodes.iter().filter(|n| !n.isolated) {
			cx += node.x;
			cy += node.y;
			count += 1;
		}
		if count == 0 {
			return;
		}
		let (cx, cy) = (cx / count as f64, cy / count as f64);
		let k = self.strength * alpha;
		for node in nodes.iter_mut().filter(|n| n.isolated) {
			node.vx += (cx - node.x) * k;
			node.vy += (cy - node.y) * k;
		}
	}
}

/// Weak mutual pull between isolated nodes closer than `threshold`.
pub struct IsolatedAttraction {
	strength: f64,
	threshold: f64,
}

impl IsolatedAttraction {
	pub fn new(strength: f64, threshold: f64) -> Self {
		Self {
			strength,
			threshold,
		}
	}
}

impl Force for IsolatedAttraction {
	fn apply(&mut self, nodes: &mut [SimNode], alpha: f64) {
		let isolated: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].isolated).collect();
		let k = self.strength * alpha;
		for (a, &i) in isolated.iter().enumerate() {
			for &j in &isolated[a + 1..] {
				let (dx, dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
				let d = (dx * dx + dy * dy).sqrt();
				if d < 1e-9 || d >= self.threshold {
					continue;
				}
				nodes[i].vx += dx * k;
				nodes[i].vy += dy * k;
				nodes[j].vx -= dx * k;
				nodes[j].vy -= dy * k;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::components::friend_graph::types::GraphNode;

	fn node(id: &str, x: f64, y: f64, isolated: bool) -> SimNode {
		SimNode::new(
			Arc::new(GraphNode {
				id: id.into(),
				name: id.into(),
				photo_url: String::new(),
				event_count: 0,
				radius: 25.0,
			}),
			x,
			y,
			isolated,
		)
	}

	fn finite(nodes: &[SimNode]) -> bool {
		nodes
			.iter()
			.all(|n| n.x.is_finite() && n.y.is_finite() && n.vx.is_finite() && n.vy.is_finite())
	}

	#[test]
	fn charge_pushes_nodes_apart() {
		let mut nodes = vec![node("a", -10.0, 0.0, false), node("b", 10.0, 0.0, false)];
		ChargeForce::new(vec![-300.0, -300.0], 1.0).apply(&mut nodes, 1.0);
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
	}

	#[test]
	fn coincident_nodes_stay_finite() {
		let mut nodes = vec![node("a", 5.0, 5.0, false), node("b", 5.0, 5.0, false)];
		ChargeForce::new(vec![-300.0, -300.0], 1.0).apply(&mut nodes, 1.0);
		CollideForce::new(vec![30.0, 30.0], 0.7, 1).apply(&mut nodes, 1.0);
		IsolatedAttraction::new(0.005, 100.0).apply(&mut nodes, 1.0);
		let link = SimLink::new(0, 1, 100.0, 0.5, 0.5);
		LinkForce::new(vec![link]).apply(&mut nodes, 1.0);
		assert!(finite(&nodes));
	}

	#[test]
	fn stretched_link_contracts() {
		let mut nodes = vec![node("a", -200.0, 0.0, false), node("b", 200.0, 0.0, false)];
		let link = SimLink::new(0, 1, 100.0, 0.5, 0.5);
		LinkForce::new(vec![link]).apply(&mut nodes, 1.0);
		assert!(nodes[0].vx > 0.0);
		assert!(nodes[1].vx < 0.0);
	}

	#[test]
	fn center_moves_mean_to_origin() {
		let mut nodes = vec![node("a", 100.0, 40.0, false), node("b", 200.0, 60.0, false)];
		CenterForce::new(0.0, 0.0, 1.0).apply(&mut nodes, 1.0);
		let mean_x = (nodes[0].x + nodes[1].x) / 2.0;
		let mean_y = (nodes[0].y + nodes[1].y) / 2.0;
		assert!(mean_x.abs() < 1e-9);
		assert!(mean_y.abs() < 1e-9);
		assert!((nodes[1].x - nodes[0].x - 100.0).abs() < 1e-9);
	}

	#[test]
	fn collide_separates_overlapping_circles() {
		let mut nodes = vec![node("a", 0.0, 0.0, false), node("b", 10.0, 0.0, false)];
		CollideForce::new(vec![30.0, 30.0], 0.7, 1).apply(&mut nodes, 1.0);
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);

		let mut apart = vec![node("a", 0.0, 0.0, false), node("b", 100.0, 0.0, false)];
		CollideForce::new(vec![30.0, 30.0], 0.7, 1).apply(&mut apart, 1.0);
		assert_eq!(apart[0].vx, 0.0);
	}

	#[test]
	fn cohesion_only_moves_isolated_nodes() {
		let mut nodes = vec![
			node("a", -50.0, 0.0, false),
			node("b", 50.0, 0.0, false),
			node("d", 400.0, 300.0, true),
		];
		CentroidCohesion::new(0.02).apply(&mut nodes, 1.0);
		assert_eq!(nodes[0].vx, 0.0);
		assert!(nodes[2].vx < 0.0);
		assert!(nodes[2].vy < 0.0);
	}

	#[test]
	fn cohesion_without_connected_nodes_is_a_noop() {
		let mut nodes = vec![node("d", 400.0, 300.0, true)];
		CentroidCohesion::new(0.02).apply(&mut nodes, 1.0);
		assert_eq!(nodes[0].vx, 0.0);
	}

	#[test]
	fn isolated_attraction_respects_threshold() {
		let mut near = vec![node("d", 0.0, 0.0, true), node("e", 50.0, 0.0, true)];
		IsolatedAttraction::new(0.005, 100.0).apply(&mut near, 1.0);
		assert!(near[0].vx > 0.0);
		assert!(near[1].vx < 0.0);

		let mut far = vec![node("d", 0.0, 0.0, true), node("e", 500.0, 0.0, true)];
		IsolatedAttraction::new(0.005, 100.0).apply(&mut far, 1.0);
		assert_eq!(far[0].vx, 0.0);
	}
}
