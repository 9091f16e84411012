//! Force-directed layout simulation.
//!
//! Runs the standard four-force layout: a spring along every edge toward a
//! target separation, inverse-distance repulsion between all node pairs, an
//! exact centroid recentering, and positional collision resolution with
//! padded footprints. Link and repulsion impulses scale with a cooling
//! parameter `alpha` that decays geometrically toward an `alpha_target`
//! each step, so an undisturbed layout settles in about 300 steps; raising
//! the target (as a drag does) reheats it.
//!
//! The simulation exclusively owns node positions and velocities. The one
//! sanctioned outside write is the drag pin: a pinned node's position is
//! forced to the pin and its velocity zeroed every step, so it acts as an
//! immovable anchor the rest of the layout reacts to.

use std::f64::consts::PI;

use super::quadtree::QuadTree;
use super::types::{GraphData, GraphDataError, NodeCategory};

/// Tuning constants for the layout.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
	/// Target separation of linked nodes, in world units.
	pub link_distance: f64,
	/// Spring constant of the link force, independent of node count.
	pub link_strength: f64,
	/// Many-body charge; negative repels.
	pub charge_strength: f64,
	/// Padding added to each node's radius for collision footprints.
	pub collision_padding: f64,
	/// Fraction of a detected overlap resolved per step.
	pub collision_strength: f64,
	/// Fraction of the centroid drift corrected per step (1.0 = exact).
	pub center_strength: f64,
	/// Velocity multiplier applied each step before integration.
	pub velocity_decay: f64,
	/// Alpha below which (with a lower target) the layout counts as settled.
	pub alpha_min: f64,
	/// Per-step geometric approach rate of alpha toward its target.
	pub alpha_decay: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Barnes-Hut opening angle for the quadtree approximation.
	pub theta: f64,
	/// Node counts above this use the quadtree instead of brute force.
	pub quadtree_threshold: usize,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			link_distance: 150.0,
			link_strength: 0.5,
			charge_strength: -600.0,
			collision_padding: 60.0,
			collision_strength: 0.7,
			center_strength: 1.0,
			velocity_decay: 0.6,
			alpha_min: 0.001,
			// Reaches alpha_min from 1.0 in ~300 steps.
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			theta: 0.9,
			quadtree_threshold: 64,
		}
	}
}

/// A node in the simulation arena.
#[derive(Clone, Debug)]
pub struct SimNode {
	/// Id carried over from the data set.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Category driving the accent color.
	pub category: NodeCategory,
	/// Base disc radius in world units.
	pub size: f64,
	/// World-space position.
	pub x: f64,
	/// World-space position.
	pub y: f64,
	/// Velocity, world units per step.
	pub vx: f64,
	/// Velocity, world units per step.
	pub vy: f64,
	/// Drag pin; while set, position is forced here every step.
	pub pin: Option<(f64, f64)>,
}

/// An edge between two arena indices.
#[derive(Clone, Debug)]
pub struct SimEdge {
	/// Arena index of the source node.
	pub source: usize,
	/// Arena index of the target node; the arrowhead points here.
	pub target: usize,
	/// Relation label drawn at the midpoint.
	pub relation: String,
}

/// The force simulation: node arena, edges, and cooling state.
///
/// Positions are read through [`Simulation::nodes`]; the only external
/// writes are [`Simulation::pin_node`] / [`Simulation::unpin_node`] and the
/// alpha target.
#[derive(Debug)]
pub struct Simulation {
	nodes: Vec<SimNode>,
	edges: Vec<SimEdge>,
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	center_x: f64,
	center_y: f64,
	rand_state: u32,
}

impl Simulation {
	/// Build a simulation from a validated data set, centered on a canvas of
	/// the given size.
	///
	/// Fails with a [`GraphDataError`] if node ids collide or an edge
	/// references an unknown id; no partial simulation is produced. Nodes
	/// start on a deterministic ring around the center so repeated runs are
	/// reproducible.
	pub fn new(data: &GraphData, width: f64, height: f64) -> Result<Self, GraphDataError> {
		Self::with_config(data, width, height, SimulationConfig::default())
	}

	/// [`Simulation::new`] with explicit tuning constants.
	pub fn with_config(
		data: &GraphData,
		width: f64,
		height: f64,
		config: SimulationConfig,
	) -> Result<Self, GraphDataError> {
		let id_to_idx = data.index_ids()?;

		let count = data.nodes.len().max(1);
		let (center_x, center_y) = (width / 2.0, height / 2.0);
		let mut nodes = Vec::with_capacity(data.nodes.len());
		for (i, node) in data.nodes.iter().enumerate() {
			let angle = i as f64 * 2.0 * PI / count as f64;
			// Sizes feed every radius downstream (gradients, collision
			// footprints, hit tests); keep them finite and non-negative.
			let size = if node.size.is_finite() {
				node.size.max(0.0)
			} else {
				0.0
			};
			nodes.push(SimNode {
				id: node.id.clone(),
				label: node.label.clone(),
				category: node.category,
				size,
				x: center_x + 100.0 * angle.cos(),
				y: center_y + 100.0 * angle.sin(),
				vx: 0.0,
				vy: 0.0,
				pin: None,
			});
		}

		let mut edges = Vec::with_capacity(data.edges.len());
		for edge in &data.edges {
			if let (Some(&source), Some(&target)) = (
				id_to_idx.get(edge.source.as_str()),
				id_to_idx.get(edge.target.as_str()),
			) {
				edges.push(SimEdge {
					source,
					target,
					relation: edge.relation.clone(),
				});
			}
		}

		// An empty arena has nothing to settle.
		let alpha = if nodes.is_empty() { 0.0 } else { 1.0 };

		Ok(Self {
			nodes,
			edges,
			config,
			alpha,
			alpha_target: 0.0,
			center_x,
			center_y,
			rand_state: 1,
		})
	}

	/// Read-only view of the node arena.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Read-only view of the edges.
	pub fn edges(&self) -> &[SimEdge] {
		&self.edges
	}

	/// Current cooling value.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Tuning constants in effect.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Whether the layout has cooled past the point of further motion.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Set the value alpha relaxes toward; raising it above `alpha_min`
	/// reheats a settled layout.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Pin a node to a world-space position. Takes effect immediately and is
	/// re-applied every step until [`Simulation::unpin_node`].
	pub fn pin_node(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pin = Some((x, y));
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// Release a pinned node back to free simulation.
	pub fn unpin_node(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pin = None;
		}
	}

	/// Advance the layout one step. Returns `false` without touching any
	/// position when the layout is settled.
	pub fn tick(&mut self) -> bool {
		if self.is_settled() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_link_force();
		self.apply_many_body_force();
		self.apply_center_force();
		self.apply_collision_force();
		self.integrate();
		true
	}

	/// Tick until settled or `max_ticks` is reached; returns ticks run.
	pub fn run_to_convergence(&mut self, max_ticks: usize) -> usize {
		let mut ticks = 0;
		while ticks < max_ticks && self.tick() {
			ticks += 1;
		}
		ticks
	}

	/// Spring every edge toward the target separation, impulse split evenly
	/// between the endpoints.
	fn apply_link_force(&mut self) {
		let k = self.config.link_strength * self.alpha;
		let target = self.config.link_distance;
		for i in 0..self.edges.len() {
			let (src, tgt) = (self.edges[i].source, self.edges[i].target);
			let (mut dx, mut dy) = (
				self.nodes[tgt].x - self.nodes[src].x,
				self.nodes[tgt].y - self.nodes[src].y,
			);
			let mut dist = (dx * dx + dy * dy).sqrt();
			if dist < 1e-12 {
				// Coincident endpoints get a tiny deterministic offset so the
				// spring has a direction to act along.
				dx = self.jiggle();
				dy = self.jiggle();
				dist = (dx * dx + dy * dy).sqrt();
			}
			let f = (dist - target) / dist * k;
			let (fx, fy) = (dx * f * 0.5, dy * f * 0.5);
			let s = &mut self.nodes[src];
			s.vx += fx;
			s.vy += fy;
			let t = &mut self.nodes[tgt];
			t.vx -= fx;
			t.vy -= fy;
		}
	}

	/// Inverse-distance repulsion between all pairs; brute force below the
	/// threshold, Barnes-Hut quadtree above it.
	fn apply_many_body_force(&mut self) {
		let k = self.config.charge_strength * self.alpha;

		if self.nodes.len() > self.config.quadtree_threshold {
			let points: Vec<(f64, f64)> = self.nodes.iter().map(|n| (n.x, n.y)).collect();
			if let Some(tree) = QuadTree::build(&points) {
				let theta = self.config.theta;
				for (i, node) in self.nodes.iter_mut().enumerate() {
					let (fx, fy) = tree.force_at(node.x, node.y, i, theta);
					node.vx += fx * k;
					node.vy += fy * k;
				}
			}
			return;
		}

		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let (mut dx, mut dy) = (
					self.nodes[j].x - self.nodes[i].x,
					self.nodes[j].y - self.nodes[i].y,
				);
				let mut l = dx * dx + dy * dy;
				if l == 0.0 {
					dx = self.jiggle();
					dy = self.jiggle();
					l = dx * dx + dy * dy;
				}
				// Boost very short distances so the impulse stays bounded by
				// the charge magnitude instead of diverging.
				if l < 1.0 {
					l = l.sqrt();
				}
				let w = k / l;
				let i_node = &mut self.nodes[i];
				i_node.vx += dx * w;
				i_node.vy += dy * w;
				let j_node = &mut self.nodes[j];
				j_node.vx -= dx * w;
				j_node.vy -= dy * w;
			}
		}
	}

	/// Translate all positions so the centroid lands on the canvas center.
	fn apply_center_force(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (mut sx, mut sy) = (0.0, 0.0);
		for node in &self.nodes {
			sx += node.x;
			sy += node.y;
		}
		let dx = (sx / n - self.center_x) * self.config.center_strength;
		let dy = (sy / n - self.center_y) * self.config.center_strength;
		for node in &mut self.nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}

	/// Push apart any two footprints (radius + padding) that overlap,
	/// half of the correction per side. Runs at full strength regardless of
	/// alpha so overlaps keep resolving as the layout cools.
	fn apply_collision_force(&mut self) {
		let padding = self.config.collision_padding;
		let strength = self.config.collision_strength;
		for i in 0..self.nodes.len() {
			for j in (i + 1)..self.nodes.len() {
				let min_dist =
					(self.nodes[i].size + padding) + (self.nodes[j].size + padding);
				let (dx, dy) = (
					self.nodes[j].x - self.nodes[i].x,
					self.nodes[j].y - self.nodes[i].y,
				);
				let dist_sq = dx * dx + dy * dy;
				if dist_sq >= min_dist * min_dist || dist_sq == 0.0 {
					continue;
				}
				let dist = dist_sq.sqrt();
				let push = (min_dist - dist) / dist * strength * 0.5;
				let (px, py) = (dx * push, dy * push);
				let i_node = &mut self.nodes[i];
				i_node.x -= px;
				i_node.y -= py;
				let j_node = &mut self.nodes[j];
				j_node.x += px;
				j_node.y += py;
			}
		}
	}

	/// Damp velocities and advance positions; pinned nodes are forced to
	/// their pin with velocity zeroed.
	fn integrate(&mut self) {
		let decay = self.config.velocity_decay;
		for node in &mut self.nodes {
			if let Some((px, py)) = node.pin {
				node.x = px;
				node.y = py;
				node.vx = 0.0;
				node.vy = 0.0;
			} else {
				node.vx *= decay;
				node.vy *= decay;
				node.x += node.vx;
				node.y += node.vy;
			}
		}
	}

	/// Small deterministic pseudo-random offset for coincident points.
	fn jiggle(&mut self) -> f64 {
		self.rand_state = self.rand_state.wrapping_mul(1664525).wrapping_add(1013904223);
		(self.rand_state as f64 / u32::MAX as f64 - 0.5) * 1e-6
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::types::{GraphEdge, GraphNode};

	/// Residual overlap allowed between two settled footprints.
	const OVERLAP_TOLERANCE: f64 = 1.0;

	fn node(id: &str, category: i64, size: f64) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			category: category.into(),
			label: id.to_string(),
			size,
		}
	}

	fn edge(source: &str, target: &str, relation: &str) -> GraphEdge {
		GraphEdge {
			source: source.to_string(),
			target: target.to_string(),
			relation: relation.to_string(),
		}
	}

	fn mitigates_data() -> GraphData {
		GraphData {
			nodes: vec![node("A9", 1, 15.0), node("R1", 4, 8.0)],
			edges: vec![edge("A9", "R1", "MITIGATES")],
		}
	}

	fn assert_no_overlap(sim: &Simulation) {
		let padding = sim.config().collision_padding;
		let nodes = sim.nodes();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let min_dist = (nodes[i].size + padding) + (nodes[j].size + padding);
				let (dx, dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
				let dist = (dx * dx + dy * dy).sqrt();
				assert!(
					dist >= min_dist - OVERLAP_TOLERANCE,
					"nodes {i} and {j} overlap: dist {dist}, min {min_dist}"
				);
			}
		}
	}

	#[test]
	fn creates_simulation_from_graph() {
		let sim = Simulation::new(&mitigates_data(), 800.0, 600.0).unwrap();
		assert_eq!(sim.nodes().len(), 2);
		assert_eq!(sim.edges().len(), 1);
		assert_eq!(sim.edges()[0].relation, "MITIGATES");
		assert_eq!(sim.nodes()[sim.edges()[0].source].id, "A9");
		assert_eq!(sim.nodes()[sim.edges()[0].target].id, "R1");
	}

	#[test]
	fn rejects_dangling_edge() {
		let data = GraphData {
			nodes: vec![node("A9", 1, 15.0)],
			edges: vec![edge("A9", "ghost", "MITIGATES")],
		};
		let err = Simulation::new(&data, 800.0, 600.0).unwrap_err();
		assert_eq!(
			err,
			GraphDataError::UnknownEdgeEndpoint {
				index: 0,
				id: "ghost".to_string(),
			}
		);
	}

	#[test]
	fn rejects_duplicate_node_id() {
		let data = GraphData {
			nodes: vec![node("A9", 1, 15.0), node("A9", 2, 8.0)],
			edges: vec![],
		};
		assert!(Simulation::new(&data, 800.0, 600.0).is_err());
	}

	#[test]
	fn negative_and_non_finite_sizes_clamp_to_zero() {
		let data = GraphData {
			nodes: vec![
				node("neg", 1, -20.0),
				node("nan", 2, f64::NAN),
				node("inf", 3, f64::INFINITY),
			],
			edges: vec![],
		};
		let mut sim = Simulation::new(&data, 800.0, 600.0).unwrap();
		for node in sim.nodes() {
			assert_eq!(node.size, 0.0);
		}

		sim.run_to_convergence(1000);
		for node in sim.nodes() {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
	}

	#[test]
	fn alpha_decays_each_tick() {
		let mut sim = Simulation::new(&mitigates_data(), 800.0, 600.0).unwrap();
		assert!(!sim.is_settled());
		assert!(sim.tick());
		assert!(sim.alpha() < 1.0);
		assert!(sim.alpha() > 0.97);
	}

	#[test]
	fn settles_with_finite_positions() {
		let mut sim = Simulation::new(&mitigates_data(), 800.0, 600.0).unwrap();
		let ticks = sim.run_to_convergence(1000);
		assert!(ticks < 1000, "did not settle within 1000 ticks");
		assert!(sim.is_settled());
		assert!(!sim.tick());
		for node in sim.nodes() {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
	}

	#[test]
	fn mitigates_scenario_settles_without_overlap() {
		let mut sim = Simulation::new(&mitigates_data(), 800.0, 600.0).unwrap();
		sim.run_to_convergence(1000);
		for node in sim.nodes() {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
		assert_eq!(sim.edges()[0].relation, "MITIGATES");
		assert_no_overlap(&sim);
	}

	#[test]
	fn linked_nodes_settle_near_target_distance() {
		let data = GraphData {
			nodes: vec![node("a", 1, 5.0), node("b", 2, 5.0)],
			edges: vec![edge("a", "b", "COVERS")],
		};
		let mut sim = Simulation::new(&data, 800.0, 600.0).unwrap();
		sim.run_to_convergence(1000);
		let nodes = sim.nodes();
		let (dx, dy) = (nodes[1].x - nodes[0].x, nodes[1].y - nodes[0].y);
		let dist = (dx * dx + dy * dy).sqrt();
		// The spring and the repulsion trade off slightly above the target
		// separation.
		assert!(dist > 149.0 && dist < 210.0, "settled at {dist}");
	}

	#[test]
	fn single_node_settles_at_center() {
		let data = GraphData {
			nodes: vec![node("solo", 3, 10.0)],
			edges: vec![],
		};
		let mut sim = Simulation::new(&data, 800.0, 600.0).unwrap();
		sim.run_to_convergence(1000);
		let node = &sim.nodes()[0];
		assert!((node.x - 400.0).abs() < 1.0);
		assert!((node.y - 300.0).abs() < 1.0);
	}

	#[test]
	fn disconnected_node_repels_but_centroid_holds() {
		let data = GraphData {
			nodes: vec![node("a", 1, 10.0), node("b", 2, 10.0), node("stray", 4, 10.0)],
			edges: vec![edge("a", "b", "COVERS")],
		};
		let mut sim = Simulation::new(&data, 800.0, 600.0).unwrap();
		sim.run_to_convergence(1000);
		let nodes = sim.nodes();
		let n = nodes.len() as f64;
		let cx: f64 = nodes.iter().map(|node| node.x).sum::<f64>() / n;
		let cy: f64 = nodes.iter().map(|node| node.y).sum::<f64>() / n;
		assert!((cx - 400.0).abs() < 1e-6);
		assert!((cy - 300.0).abs() < 1e-6);
		assert_no_overlap(&sim);
	}

	#[test]
	fn empty_graph_is_immediately_settled() {
		let mut sim = Simulation::new(&GraphData::default(), 800.0, 600.0).unwrap();
		assert!(sim.is_settled());
		assert!(!sim.tick());
	}

	#[test]
	fn pinned_node_tracks_pin_exactly() {
		let mut sim = Simulation::new(&mitigates_data(), 800.0, 600.0).unwrap();
		sim.set_alpha_target(sim.config().drag_alpha_target);
		sim.pin_node(0, 333.25, -45.5);
		for _ in 0..50 {
			sim.tick();
			let node = &sim.nodes()[0];
			assert_eq!(node.x, 333.25);
			assert_eq!(node.y, -45.5);
			assert_eq!(node.vx, 0.0);
			assert_eq!(node.vy, 0.0);
		}

		sim.unpin_node(0);
		sim.set_alpha_target(0.0);
		sim.tick();
		let node = &sim.nodes()[0];
		assert!(
			node.x != 333.25 || node.y != -45.5,
			"released node should move again"
		);
	}

	#[test]
	fn drag_target_reheats_settled_layout() {
		let mut sim = Simulation::new(&mitigates_data(), 800.0, 600.0).unwrap();
		sim.run_to_convergence(1000);
		assert!(sim.is_settled());

		sim.set_alpha_target(sim.config().drag_alpha_target);
		assert!(!sim.is_settled());
		assert!(sim.tick());
		let alpha_before = sim.alpha();
		for _ in 0..200 {
			sim.tick();
		}
		// Alpha climbs toward the held target instead of decaying.
		assert!(sim.alpha() > alpha_before);
		assert!((sim.alpha() - 0.3).abs() < 0.05);

		sim.set_alpha_target(0.0);
		let ticks = sim.run_to_convergence(2000);
		assert!(ticks < 2000);
		assert!(sim.is_settled());
	}

	#[test]
	fn quadtree_path_settles_large_graph() {
		let nodes: Vec<GraphNode> = (0..80)
			.map(|i| node(&format!("n{i}"), (i % 4 + 1) as i64, 4.0))
			.collect();
		let edges: Vec<GraphEdge> = (1..80)
			.map(|i| edge(&format!("n{}", i / 2), &format!("n{i}"), "RELATES"))
			.collect();
		let data = GraphData { nodes, edges };
		let mut sim = Simulation::new(&data, 1600.0, 1200.0).unwrap();
		let ticks = sim.run_to_convergence(2000);
		assert!(ticks < 2000, "large layout did not settle");
		for node in sim.nodes() {
			assert!(node.x.is_finite() && node.y.is_finite());
		}
	}
}
