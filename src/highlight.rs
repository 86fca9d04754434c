//! Which part of the map belongs to the hovered agent.
//!
//! A highlight is computed once per hover change and published to the store
//! as a whole; renderers only ask membership questions against it.

use std::collections::HashSet;

use crate::graph::Edge;
use crate::route::{CalcResult, DepotGroup, LocationLabel, RouteIndex, index_route};
use crate::store::StateStore;

#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
	pub agent_id: u32,
	nodes: HashSet<usize>,
	edges: HashSet<Edge>,
	depot_groups: Vec<DepotGroup>,
	location_labels: Vec<LocationLabel>,
}

impl Highlight {
	pub fn for_result(result: &CalcResult) -> Self {
		let RouteIndex {
			visited_nodes,
			visited_edges,
			depot_groups,
			location_labels,
		} = index_route(&result.route, &result.path);
		Self {
			agent_id: result.agent.id,
			nodes: visited_nodes,
			edges: visited_edges,
			depot_groups,
			location_labels,
		}
	}

	pub fn contains_node(&self, id: usize) -> bool {
		self.nodes.contains(&id)
	}

	pub fn contains_edge(&self, edge: &Edge) -> bool {
		self.edges.contains(edge)
	}

	pub fn nodes(&self) -> &HashSet<usize> {
		&self.nodes
	}

	pub fn edges(&self) -> &HashSet<Edge> {
		&self.edges
	}

	/// Pickup legend, one entry per depot visit in route order.
	pub fn depot_groups(&self) -> &[DepotGroup] {
		&self.depot_groups
	}

	pub fn location_labels(&self) -> &[LocationLabel] {
		&self.location_labels
	}
}

/// Looks the agent up in `results`; an agent that is no longer there has no
/// highlight.
pub fn resolve_highlight(agent_id: u32, results: &[CalcResult]) -> Option<Highlight> {
	results
		.iter()
		.find(|res| res.agent.id == agent_id)
		.map(Highlight::for_result)
}

/// Pointer-driven selection over the store's current results.
#[derive(Clone, Copy)]
pub struct HighlightResolver {
	store: StateStore,
}

impl HighlightResolver {
	pub fn new(store: StateStore) -> Self {
		Self { store }
	}

	/// Resolves against the results present now, not when the card was drawn.
	pub fn set_hover(&self, agent_id: u32) {
		let highlight = self
			.store
			.with_results(|results| results.and_then(|r| resolve_highlight(agent_id, &r.per_agent)));
		if highlight.is_none() {
			log::debug!("hovered agent {agent_id} has no current route");
		}
		self.store.publish_highlight(highlight);
	}

	pub fn clear_hover(&self) {
		self.store.publish_highlight(None);
	}
}
