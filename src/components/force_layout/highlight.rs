use super::model::Edge;

/// Induced neighbourhood of a focal node or edge.
///
/// Entries are positions into the model's node and edge lists, in the order
/// matching edges were found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
	pub nodes: Vec<usize>,
	pub edges: Vec<usize>,
}

impl Neighborhood {
	pub fn contains_node(&self, node: usize) -> bool {
		self.nodes.contains(&node)
	}

	pub fn contains_edge(&self, edge: usize) -> bool {
		self.edges.contains(&edge)
	}

	fn push_node(&mut self, node: usize) {
		if !self.nodes.contains(&node) {
			self.nodes.push(node);
		}
	}
}

/// The focal node, every edge touching it and the far end of each.
pub fn neighbors_of(focal: usize, edges: &[Edge]) -> Neighborhood {
	let mut hood = Neighborhood {
		nodes: vec![focal],
		edges: Vec::new(),
	};
	for (i, edge) in edges.iter().enumerate() {
		let other = if edge.source == focal {
			edge.target
		} else if edge.target == focal {
			edge.source
		} else {
			continue;
		};
		hood.edges.push(i);
		hood.push_node(other);
	}
	hood
}

/// The focal edge, both its endpoints and every edge sharing an endpoint.
pub fn neighbors_of_edge(focal: usize, edges: &[Edge]) -> Neighborhood {
	let Some(&Edge { source, target }) = edges.get(focal) else {
		return Neighborhood::default();
	};
	let mut hood = Neighborhood {
		nodes: vec![source],
		edges: Vec::new(),
	};
	hood.push_node(target);
	for (i, edge) in edges.iter().enumerate() {
		let touches = [edge.source, edge.target]
			.iter()
			.any(|n| *n == source || *n == target);
		if touches {
			hood.edges.push(i);
		}
	}
	hood
}
