//! Force-directed positioning on top of `force_graph`.
//!
//! The solver supplies pairwise repulsion and edge springs at a constant
//! time step. Each step then relaxes links toward their rest length, pulls
//! nodes gently toward the centre, limits how far any node travelled to
//! `max_step * alpha`, separates overlapping nodes and re-centres. Cooling
//! alpha therefore shrinks travel, not the forces, so the closed-form step
//! count ends on a layout that is at rest.

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::config::LayoutConfig;
use super::error::GraphError;
use super::model::GraphModel;

const NODE_MASS: f32 = 10.0;

type Point = (f64, f64);

pub struct LayoutEngine {
	/// Solver nodes carry their position in the model's node list.
	graph: ForceGraph<usize, ()>,
	links: Vec<(usize, usize)>,
	radii: Vec<f64>,
	config: LayoutConfig,
	alpha: f64,
	steps: usize,
}

impl LayoutEngine {
	pub fn new(config: LayoutConfig) -> Result<Self, GraphError> {
		config.validate()?;
		Ok(Self {
			graph: ForceGraph::new(parameters(&config)),
			links: Vec::new(),
			radii: Vec::new(),
			config,
			alpha: 1.0,
			steps: 0,
		})
	}

	#[cfg(test)]
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Total steps taken since construction.
	#[cfg(test)]
	pub fn steps(&self) -> usize {
		self.steps
	}

	pub fn is_settled(&self) -> bool {
		self.alpha <= self.config.alpha_min
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.config.width = width;
		self.config.height = height;
	}

	/// Point the solver at the model's current nodes and edges and reheat.
	///
	/// Must follow every [`GraphModel::reconcile`].
	pub fn seed(&mut self, model: &GraphModel) {
		let mut graph = ForceGraph::new(parameters(&self.config));
		let slots: Vec<DefaultNodeIdx> = model
			.nodes()
			.iter()
			.enumerate()
			.map(|(position, node)| {
				graph.add_node(NodeData {
					x: node.x as f32,
					y: node.y as f32,
					mass: NODE_MASS,
					is_anchor: false,
					user_data: position,
				})
			})
			.collect();

		self.links.clear();
		for edge in model.edges() {
			graph.add_edge(slots[edge.source], slots[edge.target], EdgeData::default());
			self.links.push((edge.source, edge.target));
		}
		self.radii = model.nodes().iter().map(|n| n.r).collect();
		self.graph = graph;
		self.alpha = 1.0;
		debug!(
			"seeded layout with {} nodes, {} links",
			self.radii.len(),
			self.links.len()
		);
	}

	/// Advance one iteration and write the new positions into `model`.
	pub fn step(&mut self, model: &mut GraphModel) {
		self.steps += 1;
		let alpha = self.alpha;
		self.alpha *= 1.0 - self.config.alpha_decay;

		let count = self.radii.len();
		if count == 0 || model.nodes().len() != count {
			return;
		}

		let start: Vec<Point> = model.nodes().iter().map(|n| (n.x, n.y)).collect();
		self.graph.update(self.config.time_step);

		let mut positions = vec![(0.0, 0.0); count];
		self.graph.visit_nodes(|node| {
			positions[node.data.user_data] = (node.x() as f64, node.y() as f64);
		});

		self.relax_links(&mut positions);
		self.pull_to_center(&mut positions);
		limit_travel(&start, &mut positions, self.config.max_step * alpha);
		if self.config.collide {
			self.separate(&mut positions);
		}
		self.recenter(&mut positions);

		self.graph.visit_nodes_mut(|node| {
			let (x, y) = positions[node.data.user_data];
			node.data.x = x as f32;
			node.data.y = y as f32;
		});
		for (node, (x, y)) in model.nodes_mut().iter_mut().zip(positions) {
			node.x = x;
			node.y = y;
		}
	}

	/// Run the closed-form number of steps for alpha to reach its floor.
	pub fn settle(&mut self, model: &mut GraphModel) -> Result<usize, GraphError> {
		let steps = self.config.settle_steps()?;
		for _ in 0..steps {
			self.step(model);
		}
		debug!("settled layout in {steps} steps, alpha {:.5}", self.alpha);
		Ok(steps)
	}

	// Link and collision passes accumulate before moving anything, so the
	// result does not depend on edge or node order.

	fn relax_links(&self, positions: &mut [Point]) {
		let rest = self.config.link_distance;
		let mut shift = vec![(0.0, 0.0); positions.len()];
		for &(s, t) in &self.links {
			let (dx, dy) = (positions[t].0 - positions[s].0, positions[t].1 - positions[s].1);
			let len = dx.hypot(dy);
			if len < f64::EPSILON {
				continue;
			}
			let k = (len - rest) / len * self.config.link_strength * 0.5;
			shift[s].0 += dx * k;
			shift[s].1 += dy * k;
			shift[t].0 -= dx * k;
			shift[t].1 -= dy * k;
		}
		apply(positions, &shift);
	}

	fn pull_to_center(&self, positions: &mut [Point]) {
		let (cx, cy) = self.config.center();
		let g = self.config.gravity;
		for p in positions.iter_mut() {
			p.0 += (cx - p.0) * g;
			p.1 += (cy - p.1) * g;
		}
	}

	fn separate(&self, positions: &mut [Point]) {
		let mut shift = vec![(0.0, 0.0); positions.len()];
		for i in 0..positions.len() {
			for j in i + 1..positions.len() {
				let min = self.radii[i] + self.radii[j];
				let (mut dx, mut dy) = (
					positions[j].0 - positions[i].0,
					positions[j].1 - positions[i].1,
				);
				let mut dist = dx.hypot(dy);
				if dist >= min {
					continue;
				}
				if dist < f64::EPSILON {
					// Coincident: split along x so the result stays deterministic.
					(dx, dy, dist) = (1.0, 0.0, 1.0);
				}
				let push = (min - dist) / dist * 0.5;
				shift[i].0 -= dx * push;
				shift[i].1 -= dy * push;
				shift[j].0 += dx * push;
				shift[j].1 += dy * push;
			}
		}
		apply(positions, &shift);
	}

	fn recenter(&self, positions: &mut [Point]) {
		let n = positions.len() as f64;
		let (sx, sy) = positions
			.iter()
			.fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
		let (cx, cy) = self.config.center();
		let k = self.config.center_strength;
		let (shift_x, shift_y) = ((cx - sx / n) * k, (cy - sy / n) * k);
		for p in positions.iter_mut() {
			p.0 += shift_x;
			p.1 += shift_y;
		}
	}
}

/// Clamp each node's move this step to `max` from where it started.
fn limit_travel(start: &[Point], positions: &mut [Point], max: f64) {
	for (p, &(x0, y0)) in positions.iter_mut().zip(start) {
		let (dx, dy) = (p.0 - x0, p.1 - y0);
		let dist = dx.hypot(dy);
		if dist > max {
			let scale = max / dist;
			*p = (x0 + dx * scale, y0 + dy * scale);
		}
	}
}

fn apply(positions: &mut [Point], shift: &[Point]) {
	for (p, d) in positions.iter_mut().zip(shift) {
		p.0 += d.0;
		p.1 += d.1;
	}
}

fn parameters(config: &LayoutConfig) -> SimulationParameters {
	SimulationParameters {
		force_charge: config.charge,
		force_spring: config.spring,
		force_max: config.force_max,
		node_speed: config.node_speed,
		damping_factor: config.damping,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_layout::types::{GraphData, GraphLink, GraphNode};

	fn chain(n: usize) -> GraphData {
		GraphData {
			nodes: (0..n).map(|i| GraphNode::new(i.to_string())).collect(),
			links: (1..n)
				.map(|i| GraphLink::new(i.to_string(), (i - 1).to_string()))
				.collect(),
		}
	}

	/// Random tree shaped like the demo page's: node i hangs off an earlier node.
	fn sample_tree(n: usize) -> GraphData {
		let pick = |i: usize| (((i + 1) * 9301 + 49297) % 233280) as f64 / 233280.0;
		GraphData {
			nodes: (0..n).map(|i| GraphNode::new(i.to_string())).collect(),
			links: (1..n)
				.map(|i| GraphLink::new(i.to_string(), ((pick(i) * i as f64) as usize).to_string()))
				.collect(),
		}
	}

	fn positions(model: &GraphModel) -> Vec<(f64, f64)> {
		model.nodes().iter().map(|n| (n.x, n.y)).collect()
	}

	fn seeded(config: LayoutConfig, data: &GraphData) -> (LayoutEngine, GraphModel) {
		let mut model = GraphModel::new(config.center(), config.node_radius);
		model.reconcile(data).unwrap();
		let mut engine = LayoutEngine::new(config).unwrap();
		engine.seed(&model);
		(engine, model)
	}

	#[test]
	fn settle_runs_exact_step_count() {
		let config = LayoutConfig {
			alpha_min: 0.001,
			alpha_decay: 0.02,
			..LayoutConfig::default()
		};
		let (mut engine, mut model) = seeded(config, &chain(5));
		assert_eq!(engine.settle(&mut model), Ok(342));
		assert_eq!(engine.steps(), 342);
		assert!(engine.is_settled());
		assert!(0.98f64.powi(341) > 0.001);
	}

	#[test]
	fn settled_tree_is_at_rest() {
		let (mut engine, mut model) = seeded(LayoutConfig::default(), &sample_tree(60));
		engine.settle(&mut model).unwrap();

		let nodes = model.nodes();
		for (i, a) in nodes.iter().enumerate() {
			for b in &nodes[i + 1..] {
				let gap = (a.x - b.x).hypot(a.y - b.y);
				assert!(gap >= 0.9 * (a.r + b.r), "{} and {} overlap: {gap}", a.id, b.id);
			}
		}

		// Reheating a settled layout should find it where it left it.
		let before = positions(&model);
		engine.seed(&model);
		engine.settle(&mut model).unwrap();
		let drift: Vec<f64> = before
			.iter()
			.zip(positions(&model))
			.map(|(a, b)| (a.0 - b.0).hypot(a.1 - b.1))
			.collect();
		let max = drift.iter().copied().fold(0.0, f64::max);
		let mean = drift.iter().sum::<f64>() / drift.len() as f64;
		let r = LayoutConfig::default().node_radius;
		assert!(max < 2.5 * r, "max drift {max}");
		assert!(mean < 0.6 * r, "mean drift {mean}");
	}

	#[test]
	fn alpha_decays_geometrically() {
		let config = LayoutConfig {
			alpha_decay: 0.1,
			..LayoutConfig::default()
		};
		let (mut engine, mut model) = seeded(config, &chain(3));
		engine.step(&mut model);
		engine.step(&mut model);
		assert!((engine.alpha() - 0.81).abs() < 1e-12);
		engine.seed(&model);
		assert_eq!(engine.alpha(), 1.0);
	}

	#[test]
	fn rejects_degenerate_alpha() {
		let config = LayoutConfig {
			alpha_decay: 1.0,
			..LayoutConfig::default()
		};
		assert!(matches!(
			LayoutEngine::new(config),
			Err(GraphError::InvalidConfig { .. })
		));
	}

	#[test]
	fn settle_is_deterministic() {
		let data = chain(8);
		let (mut a, mut model_a) = seeded(LayoutConfig::default(), &data);
		let (mut b, mut model_b) = seeded(LayoutConfig::default(), &data);
		a.settle(&mut model_a).unwrap();
		b.settle(&mut model_b).unwrap();
		for (na, nb) in model_a.nodes().iter().zip(model_b.nodes()) {
			assert!((na.x - nb.x).abs() < 1e-3 && (na.y - nb.y).abs() < 1e-3);
		}
	}

	#[test]
	fn settled_layout_is_centered_and_finite() {
		let config = LayoutConfig::default();
		let (cx, cy) = config.center();
		let (mut engine, mut model) = seeded(config, &chain(6));
		engine.settle(&mut model).unwrap();
		let n = model.nodes().len() as f64;
		let (sx, sy) = model
			.nodes()
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		assert!(model.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
		assert!((sx / n - cx).abs() < 1e-6 && (sy / n - cy).abs() < 1e-6);
	}

	#[test]
	fn collision_keeps_radii_apart() {
		let config = LayoutConfig {
			charge: 0.0,
			spring: 0.0,
			collide: true,
			..LayoutConfig::default()
		};
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			links: vec![],
		};
		let (mut engine, mut model) = seeded(config, &data);
		let (x0, y0) = (model.nodes()[0].x, model.nodes()[0].y);
		model.nodes_mut()[1].x = x0 + 5.0;
		model.nodes_mut()[1].y = y0;
		engine.seed(&model);
		engine.step(&mut model);
		let (a, b) = (&model.nodes()[0], &model.nodes()[1]);
		assert!((a.x - b.x).hypot(a.y - b.y) >= a.r + b.r - 1e-9);
	}

	#[test]
	fn empty_graph_settles_quietly() {
		let (mut engine, mut model) = seeded(LayoutConfig::default(), &GraphData::default());
		assert!(engine.settle(&mut model).is_ok());
		assert!(model.nodes().is_empty());
	}
}
