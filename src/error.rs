//! Error taxonomy for the viewer core.
//!
//! An infeasible route is not an error: it is a `CalcResult` without
//! performance and renders as such.

use thiserror::Error;

/// Violations of the dense `[0, num_nodes)` id space in wire map data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
	#[error("node id {id} is outside 0..{num_nodes}")]
	NodeOutOfRange { id: i64, num_nodes: usize },
	#[error("node {id} lists neighbour {neighbour} outside 0..{num_nodes}")]
	NeighbourOutOfRange {
		id: usize,
		neighbour: i64,
		num_nodes: usize,
	},
	#[error("node id {id} is claimed by more than one record")]
	DuplicateNode { id: usize },
	#[error("expected {expected} node records, got {actual}")]
	RecordCountMismatch { expected: usize, actual: usize },
}

/// Everything a fetch or startup step can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
	#[error("malformed graph: {0}")]
	MalformedGraph(#[from] GraphError),
	#[error("request to {endpoint} failed: {reason}")]
	RequestFailure { endpoint: String, reason: String },
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

impl ClientError {
	pub(crate) fn request(endpoint: impl Into<String>, reason: impl ToString) -> Self {
		ClientError::RequestFailure {
			endpoint: endpoint.into(),
			reason: reason.to_string(),
		}
	}
}
