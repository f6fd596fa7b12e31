use thiserror::Error;

/// Errors raised while syncing host data or configuring the layout.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
	/// A link endpoint names a node that is not in the snapshot.
	#[error("link {link} references unknown node `{id}`")]
	DanglingReference { link: usize, id: String },

	/// A node in the snapshot has a blank id.
	#[error("node at position {index} has no id")]
	MissingId { index: usize },

	/// Two nodes in the snapshot share an id.
	#[error("node id `{id}` appears more than once")]
	DuplicateId { id: String },

	/// Layout parameters that cannot produce a finite settle.
	#[error("invalid layout configuration: {reason}")]
	InvalidConfig { reason: String },
}
