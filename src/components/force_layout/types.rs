use std::collections::HashSet;

use super::error::GraphError;

/// A node as the host sees it. Only the id is consumed by the layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
	pub id: String,
}

/// A link between two node ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

/// Host-owned snapshot of the graph. Never mutated by the component.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into() }
	}
}

impl GraphLink {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

impl GraphData {
	/// Rejects snapshots with blank or repeated node ids.
	///
	/// Links are not checked here: a link to an unknown id is a recoverable
	/// dangling reference, reported during sync.
	pub fn validate(&self) -> Result<(), GraphError> {
		let mut seen = HashSet::with_capacity(self.nodes.len());
		for (index, node) in self.nodes.iter().enumerate() {
			if node.id.trim().is_empty() {
				return Err(GraphError::MissingId { index });
			}
			if !seen.insert(node.id.as_str()) {
				return Err(GraphError::DuplicateId {
					id: node.id.clone(),
				});
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_unique_ids() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			links: vec![GraphLink::new("a", "ghost")],
		};
		assert!(data.validate().is_ok());
	}

	#[test]
	fn rejects_blank_id() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("  ")],
			links: vec![],
		};
		assert_eq!(data.validate(), Err(GraphError::MissingId { index: 1 }));
	}

	#[test]
	fn rejects_duplicate_id() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b"), GraphNode::new("a")],
			links: vec![],
		};
		assert_eq!(
			data.validate(),
			Err(GraphError::DuplicateId { id: "a".into() })
		);
	}
}
