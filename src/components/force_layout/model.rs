//! Mutable working copy of the host's graph.
//!
//! The host hands over immutable [`GraphData`] snapshots. [`GraphModel`]
//! keeps its own node list keyed by id so positions survive across
//! snapshots, and rebuilds the edge list from scratch on every sync.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::{debug, warn};

use super::error::GraphError;
use super::types::GraphData;

/// Stable identity of a node for as long as its id stays in the data.
///
/// An id that is removed and later re-added gets a fresh key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub key: NodeKey,
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub r: f64,
}

/// An edge between two positions in [`GraphModel::nodes`].
///
/// Positions are only valid until the next sync, which rebuilds every edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	pub source: usize,
	pub target: usize,
}

/// What a sync changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
	pub added: usize,
	pub removed: usize,
	/// Links skipped because an endpoint is unknown.
	pub dangling: Vec<GraphError>,
}

#[derive(Clone, Debug)]
pub struct GraphModel {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	by_id: HashMap<String, usize>,
	by_key: HashMap<NodeKey, usize>,
	next_key: u64,
	center: (f64, f64),
	radius: f64,
}

const SPIRAL_STEP: f64 = 10.0;

impl GraphModel {
	pub fn new(center: (f64, f64), radius: f64) -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			by_id: HashMap::new(),
			by_key: HashMap::new(),
			next_key: 0,
			center,
			radius,
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, position: usize) -> Option<&Node> {
		self.nodes.get(position)
	}

	pub fn position_of_id(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}

	pub fn position_of_key(&self, key: NodeKey) -> Option<usize> {
		self.by_key.get(&key).copied()
	}

	pub fn set_center(&mut self, center: (f64, f64)) {
		self.center = center;
	}

	/// Bring the working set in line with `data`.
	///
	/// Malformed snapshots are rejected before anything changes. Links with an
	/// unknown endpoint are left out and listed in the report.
	pub fn reconcile(&mut self, data: &GraphData) -> Result<SyncReport, GraphError> {
		data.validate()?;
		let mut report = SyncReport::default();

		for node in &data.nodes {
			if self.by_id.contains_key(&node.id) {
				continue;
			}
			let node = self.spawn(&node.id);
			self.by_id.insert(node.id.clone(), self.nodes.len());
			self.by_key.insert(node.key, self.nodes.len());
			self.nodes.push(node);
			report.added += 1;
		}

		let retain: HashSet<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		let before = self.nodes.len();
		self.nodes.retain(|n| retain.contains(n.id.as_str()));
		report.removed = before - self.nodes.len();
		if report.removed > 0 {
			self.reindex();
		}

		self.edges.clear();
		for (link, l) in data.links.iter().enumerate() {
			let source = self.position_of_id(&l.source);
			let target = self.position_of_id(&l.target);
			match (source, target) {
				(Some(source), Some(target)) => self.edges.push(Edge { source, target }),
				_ => {
					let id = if source.is_none() { &l.source } else { &l.target };
					let err = GraphError::DanglingReference {
						link,
						id: id.clone(),
					};
					warn!("skipping edge: {err}");
					report.dangling.push(err);
				}
			}
		}

		debug!(
			"synced graph: {} nodes (+{} -{}), {} edges, {} dangling",
			self.nodes.len(),
			report.added,
			report.removed,
			self.edges.len(),
			report.dangling.len()
		);
		Ok(report)
	}

	fn spawn(&mut self, id: &str) -> Node {
		let serial = self.next_key;
		self.next_key += 1;

		// Phyllotaxis around the centre: deterministic and never coincident.
		let golden = PI * (3.0 - 5f64.sqrt());
		let (radius, angle) = (SPIRAL_STEP * (0.5 + serial as f64).sqrt(), serial as f64 * golden);
		Node {
			key: NodeKey(serial),
			id: id.to_owned(),
			x: self.center.0 + radius * angle.cos(),
			y: self.center.1 + radius * angle.sin(),
			r: self.radius,
		}
	}

	fn reindex(&mut self) {
		self.by_id.clear();
		self.by_key.clear();
		for (i, node) in self.nodes.iter().enumerate() {
			self.by_id.insert(node.id.clone(), i);
			self.by_key.insert(node.key, i);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_layout::types::{GraphLink, GraphNode};

	fn data(nodes: &[&str], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: nodes.iter().map(|id| GraphNode::new(*id)).collect(),
			links: links.iter().map(|(s, t)| GraphLink::new(*s, *t)).collect(),
		}
	}

	fn ids(model: &GraphModel) -> Vec<&str> {
		model.nodes().iter().map(|n| n.id.as_str()).collect()
	}

	fn model() -> GraphModel {
		GraphModel::new((500.0, 500.0), 10.0)
	}

	#[test]
	fn reconcile_is_idempotent() {
		let mut model = model();
		let snapshot = data(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
		model.reconcile(&snapshot).unwrap();
		let nodes = model.nodes().to_vec();
		let edges = model.edges().to_vec();

		let report = model.reconcile(&snapshot).unwrap();
		assert_eq!(report, SyncReport::default());
		assert_eq!(model.nodes(), nodes.as_slice());
		assert_eq!(model.edges(), edges.as_slice());
	}

	#[test]
	fn removed_node_drops_its_edges_as_dangling() {
		let mut model = model();
		model
			.reconcile(&data(&["a", "b", "c"], &[("a", "b"), ("a", "c")]))
			.unwrap();
		let c_key = model.nodes()[2].key;

		let report = model
			.reconcile(&data(&["a", "c"], &[("a", "b"), ("a", "c")]))
			.unwrap();

		assert_eq!(ids(&model), ["a", "c"]);
		assert_eq!(report.removed, 1);
		assert_eq!(
			report.dangling,
			vec![GraphError::DanglingReference {
				link: 0,
				id: "b".into()
			}]
		);
		assert_eq!(model.edges(), &[Edge { source: 0, target: 1 }]);
		assert_eq!(model.position_of_key(c_key), Some(1));
		assert_eq!(model.position_of_id("b"), None);
	}

	#[test]
	fn consecutive_stale_nodes_are_all_removed() {
		let mut model = model();
		model.reconcile(&data(&["a", "b", "c", "d", "e"], &[])).unwrap();
		model.reconcile(&data(&["a", "e"], &[])).unwrap();
		assert_eq!(ids(&model), ["a", "e"]);
		assert_eq!(model.position_of_id("e"), Some(1));
	}

	#[test]
	fn dangling_target_is_reported_and_skipped() {
		let mut model = model();
		let report = model
			.reconcile(&data(&["a", "b"], &[("a", "ghost")]))
			.unwrap();
		assert_eq!(
			report.dangling,
			vec![GraphError::DanglingReference {
				link: 0,
				id: "ghost".into()
			}]
		);
		assert!(model.edges().is_empty());
		assert_eq!(model.position_of_id("a"), Some(0));
	}

	#[test]
	fn malformed_snapshot_leaves_model_untouched() {
		let mut model = model();
		model.reconcile(&data(&["a"], &[])).unwrap();
		let err = model.reconcile(&data(&["b", "b"], &[])).unwrap_err();
		assert_eq!(err, GraphError::DuplicateId { id: "b".into() });
		assert_eq!(ids(&model), ["a"]);
	}

	#[test]
	fn new_nodes_are_seeded_apart_near_center() {
		let mut model = model();
		model.reconcile(&data(&["a", "b", "c"], &[])).unwrap();
		let nodes = model.nodes();
		for (i, a) in nodes.iter().enumerate() {
			assert!((a.x - 500.0).abs() < 50.0 && (a.y - 500.0).abs() < 50.0);
			assert_eq!(a.r, 10.0);
			for b in &nodes[i + 1..] {
				assert!((a.x - b.x).hypot(a.y - b.y) > 1.0);
			}
		}
	}

	#[test]
	fn readded_id_gets_fresh_key() {
		let mut model = model();
		model.reconcile(&data(&["a"], &[])).unwrap();
		let first = model.nodes()[0].key;
		model.reconcile(&data(&[], &[])).unwrap();
		model.reconcile(&data(&["a"], &[])).unwrap();
		assert_ne!(model.nodes()[0].key, first);
	}
}
