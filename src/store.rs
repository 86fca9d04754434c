//! Session-wide reactive state.
//!
//! Every field is a signal holding an immutable snapshot. Writers go through
//! the named operations below, which replace a snapshot as a whole, so a
//! subscriber sees one transition per update and never a half-applied one.

use std::sync::Arc;

use leptos::prelude::*;

use crate::graph::MapGraph;
use crate::highlight::{Highlight, resolve_highlight};
use crate::requests::{Channel, RequestLedger, RequestTicket};
use crate::route::{Agent, Parcel, SimulationResults};

#[derive(Clone, Copy)]
pub struct StateStore {
	graph: RwSignal<Arc<MapGraph>>,
	parcels: RwSignal<Arc<Vec<Parcel>>>,
	agents: RwSignal<Arc<Vec<Agent>>>,
	results: RwSignal<Option<Arc<SimulationResults>>>,
	highlight: RwSignal<Option<Arc<Highlight>>>,
	is_loading: RwSignal<bool>,
	is_picking: RwSignal<bool>,
	is_simulating: RwSignal<bool>,
	progress: RwSignal<u32>,
	requests: StoredValue<RequestLedger>,
}

impl Default for StateStore {
	fn default() -> Self {
		Self::new()
	}
}

impl StateStore {
	pub fn new() -> Self {
		Self {
			graph: RwSignal::new(Arc::new(MapGraph::default())),
			parcels: RwSignal::new(Arc::new(Vec::new())),
			agents: RwSignal::new(Arc::new(Vec::new())),
			results: RwSignal::new(None),
			highlight: RwSignal::new(None),
			is_loading: RwSignal::new(false),
			is_picking: RwSignal::new(false),
			is_simulating: RwSignal::new(false),
			progress: RwSignal::new(0),
			requests: StoredValue::new(RequestLedger::default()),
		}
	}

	pub fn graph(&self) -> ReadSignal<Arc<MapGraph>> {
		self.graph.read_only()
	}

	pub fn parcels(&self) -> ReadSignal<Arc<Vec<Parcel>>> {
		self.parcels.read_only()
	}

	pub fn agents(&self) -> ReadSignal<Arc<Vec<Agent>>> {
		self.agents.read_only()
	}

	/// `None` until a route computation has completed.
	pub fn results(&self) -> ReadSignal<Option<Arc<SimulationResults>>> {
		self.results.read_only()
	}

	pub fn highlight(&self) -> ReadSignal<Option<Arc<Highlight>>> {
		self.highlight.read_only()
	}

	pub fn is_loading(&self) -> ReadSignal<bool> {
		self.is_loading.read_only()
	}

	pub fn is_picking(&self) -> ReadSignal<bool> {
		self.is_picking.read_only()
	}

	pub fn is_simulating(&self) -> ReadSignal<bool> {
		self.is_simulating.read_only()
	}

	pub fn progress(&self) -> ReadSignal<u32> {
		self.progress.read_only()
	}

	/// Reads the current results without subscribing.
	pub fn with_results<R>(&self, f: impl FnOnce(Option<&SimulationResults>) -> R) -> R {
		self.results.with_untracked(|results| f(results.as_deref()))
	}

	/// Issues a new generation on `channel`, superseding anything in flight there.
	pub fn begin_request(&self, channel: Channel) -> RequestTicket {
		self.requests
			.try_update_value(|ledger| ledger.issue(channel))
			.unwrap_or_else(|| RequestTicket::detached(channel))
	}

	pub fn is_current(&self, ticket: RequestTicket) -> bool {
		self.requests
			.try_with_value(|ledger| ledger.is_current(ticket))
			.unwrap_or(false)
	}

	fn accept(&self, ticket: RequestTicket) -> bool {
		let current = self.is_current(ticket);
		if !current {
			log::debug!(
				"dropping stale {:?} response (generation {})",
				ticket.channel,
				ticket.generation
			);
		}
		current
	}

	/// Swaps node table and edges together. Returns whether it was applied.
	pub fn replace_graph(&self, ticket: RequestTicket, graph: MapGraph) -> bool {
		if !self.accept(ticket) {
			return false;
		}
		log::info!(
			"map applied: {} nodes, {} edges",
			graph.nodes().len(),
			graph.edges().len()
		);
		self.graph.set(Arc::new(graph));
		true
	}

	pub fn replace_parcels(&self, ticket: RequestTicket, parcels: Vec<Parcel>) -> bool {
		if !self.accept(ticket) {
			return false;
		}
		log::info!("parcels applied: {}", parcels.len());
		self.parcels.set(Arc::new(parcels));
		true
	}

	pub fn replace_agents(&self, ticket: RequestTicket, agents: Vec<Agent>) -> bool {
		if !self.accept(ticket) {
			return false;
		}
		log::info!("agents applied: {}", agents.len());
		self.agents.set(Arc::new(agents));
		true
	}

	/// Replaces the results and re-resolves an active highlight against them,
	/// dropping it when its agent is gone.
	pub fn replace_results(&self, ticket: RequestTicket, results: SimulationResults) -> bool {
		if !self.accept(ticket) {
			return false;
		}
		log::info!("route results applied for {} agents", results.per_agent.len());
		let hovered = self
			.highlight
			.with_untracked(|highlight| highlight.as_ref().map(|h| h.agent_id));
		let refreshed = hovered.and_then(|agent_id| resolve_highlight(agent_id, &results.per_agent));
		self.results.set(Some(Arc::new(results)));
		self.publish_highlight(refreshed);
		true
	}

	pub fn clear_results(&self) {
		if self.results.with_untracked(Option::is_some) {
			self.results.set(None);
		}
		self.publish_highlight(None);
	}

	/// The only way a highlight changes. Clearing an absent highlight is a no-op
	/// so subscribers are not woken for nothing.
	pub fn publish_highlight(&self, highlight: Option<Highlight>) {
		if highlight.is_none() && self.highlight.with_untracked(Option::is_none) {
			return;
		}
		self.highlight.set(highlight.map(Arc::new));
	}

	pub fn set_loading(&self, loading: bool) {
		if self.is_loading.get_untracked() != loading {
			self.is_loading.set(loading);
		}
	}

	pub fn set_picking(&self, picking: bool) {
		if self.is_picking.get_untracked() != picking {
			self.is_picking.set(picking);
		}
	}

	pub fn toggle_picking(&self) {
		self.is_picking.update(|picking| *picking = !*picking);
	}

	pub fn set_simulating(&self, simulating: bool) {
		if self.is_simulating.get_untracked() != simulating {
			self.is_simulating.set(simulating);
		}
	}

	pub fn set_progress(&self, percent: u32) {
		if self.progress.get_untracked() != percent {
			self.progress.set(percent);
		}
	}
}

#[cfg(test)]
mod tests {
	use leptos::reactive::owner::Owner;

	use super::*;
	use crate::graph::{NodeRecord, build_graph};
	use crate::highlight::HighlightResolver;
	use crate::route::{CalcResult, ResultsSummary, Stop};

	fn with_owner(f: impl FnOnce()) {
		let owner = Owner::new();
		owner.with(f);
	}

	fn results(agent_ids: &[u32]) -> SimulationResults {
		SimulationResults {
			per_agent: agent_ids
				.iter()
				.map(|&id| CalcResult {
					agent: Agent {
						id,
						max_capacity: 4,
						max_dist: 500.0,
					},
					route: vec![Stop::Depot],
					path: vec![0, id as usize + 1, 0],
					color: "#00ff00".to_string(),
					performance: None,
				})
				.collect(),
			summary: ResultsSummary::default(),
		}
	}

	fn graph(n: usize) -> MapGraph {
		let records: Vec<NodeRecord> = (0..n)
			.map(|id| NodeRecord {
				id: id as i64,
				x: 0.0,
				y: 0.0,
				color: [0, 0, 0],
				neighbours: vec![],
			})
			.collect();
		build_graph(n, &records).unwrap()
	}

	#[test]
	fn test_graph_replaced_as_one_snapshot() {
		with_owner(|| {
			let store = StateStore::new();
			let ticket = store.begin_request(Channel::Map);
			assert!(store.replace_graph(ticket, graph(3)));
			assert_eq!(store.graph().get_untracked().nodes().len(), 3);
		});
	}

	#[test]
	fn test_stale_response_is_dropped() {
		with_owner(|| {
			let store = StateStore::new();
			let older = store.begin_request(Channel::Map);
			let newer = store.begin_request(Channel::Map);
			assert!(store.replace_graph(newer, graph(4)));
			assert!(!store.replace_graph(older, graph(2)));
			assert_eq!(store.graph().get_untracked().nodes().len(), 4);
		});
	}

	#[test]
	fn test_hover_publishes_highlight() {
		with_owner(|| {
			let store = StateStore::new();
			let ticket = store.begin_request(Channel::Simulation);
			store.replace_results(ticket, results(&[0, 1]));

			let resolver = HighlightResolver::new(store);
			resolver.set_hover(1);
			let highlight = store.highlight().get_untracked().unwrap();
			assert_eq!(highlight.agent_id, 1);
			assert!(highlight.contains_node(2));

			resolver.clear_hover();
			assert!(store.highlight().get_untracked().is_none());
		});
	}

	#[test]
	fn test_hover_on_absent_agent_clears() {
		with_owner(|| {
			let store = StateStore::new();
			let resolver = HighlightResolver::new(store);
			resolver.set_hover(3);
			assert!(store.highlight().get_untracked().is_none());

			let ticket = store.begin_request(Channel::Simulation);
			store.replace_results(ticket, results(&[0]));
			resolver.set_hover(0);
			resolver.set_hover(7);
			assert!(store.highlight().get_untracked().is_none());
		});
	}

	#[test]
	fn test_switching_agents_swaps_highlight() {
		with_owner(|| {
			let store = StateStore::new();
			let ticket = store.begin_request(Channel::Simulation);
			store.replace_results(ticket, results(&[0, 1]));
			let resolver = HighlightResolver::new(store);

			resolver.set_hover(0);
			resolver.set_hover(1);
			let highlight = store.highlight().get_untracked().unwrap();
			assert_eq!(highlight.agent_id, 1);
			assert!(!highlight.contains_node(1));
		});
	}

	#[test]
	fn test_new_results_drop_stale_highlight() {
		with_owner(|| {
			let store = StateStore::new();
			let first = store.begin_request(Channel::Simulation);
			store.replace_results(first, results(&[0, 5]));
			HighlightResolver::new(store).set_hover(5);
			assert!(store.highlight().get_untracked().is_some());

			let second = store.begin_request(Channel::Simulation);
			store.replace_results(second, results(&[0]));
			assert!(store.highlight().get_untracked().is_none());
		});
	}

	#[test]
	fn test_new_results_refresh_surviving_highlight() {
		with_owner(|| {
			let store = StateStore::new();
			let first = store.begin_request(Channel::Simulation);
			store.replace_results(first, results(&[0]));
			HighlightResolver::new(store).set_hover(0);

			let mut next = results(&[0]);
			next.per_agent[0].path = vec![0, 9];
			let second = store.begin_request(Channel::Simulation);
			store.replace_results(second, next);
			let highlight = store.highlight().get_untracked().unwrap();
			assert!(highlight.contains_node(9));
			assert!(!highlight.contains_node(1));
		});
	}

	#[test]
	fn test_clear_results() {
		with_owner(|| {
			let store = StateStore::new();
			let ticket = store.begin_request(Channel::Simulation);
			store.replace_results(ticket, results(&[0]));
			HighlightResolver::new(store).set_hover(0);
			store.clear_results();
			assert!(store.results().get_untracked().is_none());
			assert!(store.highlight().get_untracked().is_none());
		});
	}

	#[test]
	fn test_flags() {
		with_owner(|| {
			let store = StateStore::new();
			store.set_loading(true);
			store.toggle_picking();
			store.set_simulating(true);
			store.set_progress(42);
			assert!(store.is_loading().get_untracked());
			assert!(store.is_picking().get_untracked());
			assert!(store.is_simulating().get_untracked());
			assert_eq!(store.progress().get_untracked(), 42);
			store.toggle_picking();
			assert!(!store.is_picking().get_untracked());
		});
	}
}
