//! Road network construction from wire node records.
//!
//! The service lists every edge from both of its endpoints, so edges are
//! canonicalised to `(small, large)` and collected as a set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// A point in the road network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: usize,
	pub x: f64,
	pub y: f64,
	/// `#rrggbb`
	pub color: String,
}

/// Undirected connection between two nodes, always stored with `small < large`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Edge {
	small: usize,
	large: usize,
}

impl Edge {
	/// Canonicalises the pair. Returns `None` for a self-loop, which has no
	/// `small < large` orientation.
	pub fn new(a: usize, b: usize) -> Option<Self> {
		match a.cmp(&b) {
			std::cmp::Ordering::Less => Some(Self { small: a, large: b }),
			std::cmp::Ordering::Greater => Some(Self { small: b, large: a }),
			std::cmp::Ordering::Equal => None,
		}
	}

	pub fn small(&self) -> usize {
		self.small
	}

	pub fn large(&self) -> usize {
		self.large
	}
}

/// One node as the map endpoints send it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeRecord {
	pub id: i64,
	pub x: f64,
	pub y: f64,
	pub color: [u8; 3],
	#[serde(default)]
	pub neighbours: Vec<i64>,
}

/// Body of `GET /map` and `POST /map`.
#[derive(Clone, Debug, Deserialize)]
pub struct MapPayload {
	pub no_of_nodes: usize,
	pub nodes: Vec<NodeRecord>,
}

impl MapPayload {
	pub fn into_graph(self) -> Result<MapGraph, GraphError> {
		build_graph(self.no_of_nodes, &self.nodes)
	}
}

/// Dense node table plus deduplicated edges for one map generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapGraph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	edge_set: HashSet<Edge>,
}

impl MapGraph {
	/// Nodes indexed by id.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in first-seen order, which is also their draw order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: usize) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn has_edge(&self, edge: &Edge) -> bool {
		self.edge_set.contains(edge)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Encodes an RGB triple as `#rrggbb`, zero-padding each byte.
pub fn encode_color(rgb: [u8; 3]) -> String {
	format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Builds the node table and edge set, or fails without partial output when
/// the records do not cover `[0, num_nodes)` exactly once.
pub fn build_graph(num_nodes: usize, records: &[NodeRecord]) -> Result<MapGraph, GraphError> {
	if records.len() != num_nodes {
		return Err(GraphError::RecordCountMismatch {
			expected: num_nodes,
			actual: records.len(),
		});
	}

	let mut slots: Vec<Option<Node>> = vec![None; num_nodes];
	let mut edges = Vec::new();
	let mut edge_set = HashSet::new();

	for record in records {
		let id = checked_id(record.id, num_nodes).ok_or(GraphError::NodeOutOfRange {
			id: record.id,
			num_nodes,
		})?;
		if slots[id].is_some() {
			return Err(GraphError::DuplicateNode { id });
		}
		slots[id] = Some(Node {
			id,
			x: record.x,
			y: record.y,
			color: encode_color(record.color),
		});

		for &neighbour in &record.neighbours {
			let other = checked_id(neighbour, num_nodes).ok_or(GraphError::NeighbourOutOfRange {
				id,
				neighbour,
				num_nodes,
			})?;
			let Some(edge) = Edge::new(id, other) else {
				continue;
			};
			if edge_set.insert(edge) {
				edges.push(edge);
			}
		}
	}

	// Count matched and no id repeated, so every slot is filled.
	let nodes: Vec<Node> = slots.into_iter().flatten().collect();
	debug_assert_eq!(nodes.len(), num_nodes);
	log::debug!("built map graph: {} nodes, {} edges", nodes.len(), edges.len());

	Ok(MapGraph {
		nodes,
		edges,
		edge_set,
	})
}

fn checked_id(id: i64, num_nodes: usize) -> Option<usize> {
	usize::try_from(id).ok().filter(|&id| id < num_nodes)
}
