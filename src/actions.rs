//! Fetch workflows that connect the service client to the store.
//!
//! Failures leave the previously applied state in place; only UI flags are
//! reverted. Nothing is retried here.

use leptos::prelude::*;

use crate::api::{AgentOptions, ApiClient, MapOptions, ParcelOptions, RoutingService};
use crate::config::ProgressConfig;
use crate::progress::{BrowserTimer, IntervalTimer, ProgressRun, RandomSteps, StepSource};
use crate::requests::Channel;
use crate::route::{Agent, Parcel};
use crate::store::StateStore;

/// Component-owned slot holding a progress run. Disposing the slot drops the
/// run, which cancels its timer.
pub type ProgressSlot<T, S> = StoredValue<ProgressRun<T, S>, LocalStorage>;

pub type SimulationProgress = ProgressRun<BrowserTimer, RandomSteps>;

pub type ProgressHandle = ProgressSlot<BrowserTimer, RandomSteps>;

/// Fetches map, parcels and agents side by side; each is applied on its own.
pub async fn load_initial<A: RoutingService>(api: A, store: StateStore) {
	let map = store.begin_request(Channel::Map);
	let parcels = store.begin_request(Channel::Parcels);
	let agents = store.begin_request(Channel::Agents);

	let (graph, parcel_list, agent_list) =
		futures::join!(api.fetch_map(), api.fetch_parcels(), api.fetch_agents());
	match graph {
		Ok(graph) => {
			store.replace_graph(map, graph);
		}
		Err(err) => log::warn!("loading map: {err}"),
	}
	match parcel_list {
		Ok(list) => {
			store.replace_parcels(parcels, list);
		}
		Err(err) => log::warn!("loading parcels: {err}"),
	}
	match agent_list {
		Ok(list) => {
			store.replace_agents(agents, list);
		}
		Err(err) => log::warn!("loading agents: {err}"),
	}
}

/// Regenerates the map, then parcels (which need the new node count) and
/// agents together.
pub async fn regenerate(api: ApiClient, store: StateStore) {
	let map = store.begin_request(Channel::Map);
	let parcels = store.begin_request(Channel::Parcels);
	let agents = store.begin_request(Channel::Agents);
	store.clear_results();

	match api.create_map(&MapOptions::default()).await {
		Ok(graph) => {
			store.replace_graph(map, graph);
		}
		Err(err) => log::warn!("regenerating map: {err}"),
	}
	let (parcel_options, agent_options) = (ParcelOptions::default(), AgentOptions::default());
	let (parcel_list, agent_list) = futures::join!(
		api.reroll_parcels(&parcel_options),
		api.reroll_agents(&agent_options)
	);
	match parcel_list {
		Ok(list) => {
			store.replace_parcels(parcels, list);
		}
		Err(err) => log::warn!("rerolling parcels: {err}"),
	}
	match agent_list {
		Ok(list) => {
			store.replace_agents(agents, list);
		}
		Err(err) => log::warn!("rerolling agents: {err}"),
	}
}

pub async fn update_parcels(api: ApiClient, store: StateStore, parcels: Vec<Parcel>) {
	let ticket = store.begin_request(Channel::Parcels);
	match api.update_parcels(&parcels).await {
		Ok(list) => {
			store.replace_parcels(ticket, list);
		}
		Err(err) => log::warn!("updating parcels: {err}"),
	}
}

pub async fn update_agents(api: ApiClient, store: StateStore, agents: Vec<Agent>) {
	let ticket = store.begin_request(Channel::Agents);
	match api.update_agents(&agents).await {
		Ok(list) => {
			store.replace_agents(ticket, list);
		}
		Err(err) => log::warn!("updating agents: {err}"),
	}
}

/// Creates the progress run for one route computation.
pub fn new_progress(config: &ProgressConfig) -> SimulationProgress {
	ProgressRun::new(BrowserTimer, config, RandomSteps::new(config.max_step))
}

/// Runs the route computation with a synthetic progress indicator.
///
/// On success the results replace the previous ones and the simulating toggle
/// stays on; on failure the previous results stay and both flags revert.
pub async fn run_simulation<A, T, S>(api: A, store: StateStore, progress: ProgressSlot<T, S>)
where
	A: RoutingService,
	T: IntervalTimer + 'static,
	T::Handle: 'static,
	S: StepSource + 'static,
{
	let ticket = store.begin_request(Channel::Simulation);
	store.set_simulating(true);
	store.set_loading(true);
	progress.try_update_value(|run| run.start(move |percent| store.set_progress(percent)));

	let outcome = api.solve_routes().await;
	if !store.is_current(ticket) {
		// Stopped or superseded while in flight; whoever did that settled already.
		log::debug!("ignoring superseded route computation");
		return;
	}

	settle(store, progress);
	match outcome {
		Ok(results) => {
			store.replace_results(ticket, results);
			store.set_loading(false);
		}
		Err(err) => {
			log::warn!("route computation failed: {err}");
			store.set_loading(false);
			store.set_simulating(false);
		}
	}
}

/// Turns the simulating toggle off. An outstanding computation is
/// invalidated and its result will be dropped when it lands.
pub fn stop_simulation<T, S>(store: StateStore, progress: ProgressSlot<T, S>)
where
	T: IntervalTimer + 'static,
	T::Handle: 'static,
	S: StepSource + 'static,
{
	store.begin_request(Channel::Simulation);
	settle(store, progress);
	store.set_loading(false);
	store.set_simulating(false);
	store.clear_results();
}

fn settle<T, S>(store: StateStore, progress: ProgressSlot<T, S>)
where
	T: IntervalTimer + 'static,
	T::Handle: 'static,
	S: StepSource + 'static,
{
	let percent = progress.try_update_value(|run| run.settle()).unwrap_or(0);
	store.set_progress(percent);
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::future::Future;
	use std::rc::Rc;

	use futures::channel::oneshot;
	use futures::executor::LocalPool;
	use futures::task::LocalSpawnExt;
	use leptos::reactive::owner::Owner;

	use super::*;
	use crate::error::ClientError;
	use crate::graph::MapGraph;
	use crate::progress::FixedStep;
	use crate::progress::testing::ManualTimer;
	use crate::route::{CalcResult, ResultsSummary, SimulationResults, Stop};

	type Reply<T> = oneshot::Receiver<Result<T, ClientError>>;

	/// Each call answers whenever the test sends its reply, and records that
	/// it was polled.
	#[derive(Default)]
	struct PendingService {
		map: RefCell<Option<Reply<MapGraph>>>,
		parcels: RefCell<Option<Reply<Vec<Parcel>>>>,
		agents: RefCell<Option<Reply<Vec<Agent>>>>,
		routes: RefCell<Option<Reply<SimulationResults>>>,
		polled: Rc<RefCell<Vec<&'static str>>>,
	}

	fn answer<T>(
		endpoint: &'static str,
		reply: &RefCell<Option<Reply<T>>>,
		polled: &Rc<RefCell<Vec<&'static str>>>,
	) -> impl Future<Output = Result<T, ClientError>> + use<T> {
		let reply = reply.borrow_mut().take();
		let polled = Rc::clone(polled);
		async move {
			polled.borrow_mut().push(endpoint);
			match reply {
				Some(rx) => rx
					.await
					.unwrap_or_else(|_| Err(ClientError::request(endpoint, "reply dropped"))),
				None => Err(ClientError::request(endpoint, "no reply queued")),
			}
		}
	}

	impl RoutingService for PendingService {
		fn fetch_map(&self) -> impl Future<Output = Result<MapGraph, ClientError>> {
			answer("/map", &self.map, &self.polled)
		}

		fn fetch_parcels(&self) -> impl Future<Output = Result<Vec<Parcel>, ClientError>> {
			answer("/parcels", &self.parcels, &self.polled)
		}

		fn fetch_agents(&self) -> impl Future<Output = Result<Vec<Agent>, ClientError>> {
			answer("/agents", &self.agents, &self.polled)
		}

		fn solve_routes(&self) -> impl Future<Output = Result<SimulationResults, ClientError>> {
			answer("/simulate", &self.routes, &self.polled)
		}
	}

	fn pending() -> (PendingService, oneshot::Sender<Result<SimulationResults, ClientError>>) {
		let (tx, rx) = oneshot::channel();
		let service = PendingService {
			routes: RefCell::new(Some(rx)),
			..Default::default()
		};
		(service, tx)
	}

	fn results(agent_id: u32) -> SimulationResults {
		SimulationResults {
			per_agent: vec![CalcResult {
				agent: Agent {
					id: agent_id,
					max_capacity: 2,
					max_dist: 100.0,
				},
				route: vec![Stop::Depot],
				path: vec![0, 1, 0],
				color: "#ff0000".to_string(),
				performance: None,
			}],
			summary: ResultsSummary::default(),
		}
	}

	fn progress_slot(timer: &ManualTimer) -> ProgressSlot<ManualTimer, FixedStep> {
		let config = ProgressConfig {
			interval_ms: 1300,
			ceiling: 85,
			max_step: 10,
		};
		StoredValue::new_local(ProgressRun::new(timer.clone(), &config, FixedStep(10)))
	}

	fn agent_ids(store: StateStore) -> Option<Vec<u32>> {
		store
			.results()
			.get_untracked()
			.map(|r| r.per_agent.iter().map(|res| res.agent.id).collect())
	}

	#[test]
	fn test_success_applies_results_and_settles() {
		Owner::new().with(|| {
			let store = StateStore::new();
			let timer = ManualTimer::default();
			let progress = progress_slot(&timer);
			let (service, reply) = pending();
			let mut pool = LocalPool::new();
			pool.spawner()
				.spawn_local(run_simulation(service, store, progress))
				.unwrap();

			pool.run_until_stalled();
			assert!(store.is_loading().get_untracked());
			assert!(store.is_simulating().get_untracked());
			assert_eq!(timer.live_intervals(), 1);
			timer.fire();
			assert_eq!(store.progress().get_untracked(), 10);

			reply.send(Ok(results(3))).unwrap();
			pool.run_until_stalled();
			assert_eq!(agent_ids(store), Some(vec![3]));
			assert!(!store.is_loading().get_untracked());
			assert!(store.is_simulating().get_untracked());
			assert_eq!(store.progress().get_untracked(), 0);
			assert_eq!(timer.live_intervals(), 0);
		});
	}

	#[test]
	fn test_failure_reverts_flags_and_keeps_results() {
		Owner::new().with(|| {
			let store = StateStore::new();
			let earlier = store.begin_request(Channel::Simulation);
			assert!(store.replace_results(earlier, results(1)));

			let timer = ManualTimer::default();
			let progress = progress_slot(&timer);
			let (service, reply) = pending();
			let mut pool = LocalPool::new();
			pool.spawner()
				.spawn_local(run_simulation(service, store, progress))
				.unwrap();
			pool.run_until_stalled();
			timer.fire();

			reply
				.send(Err(ClientError::request("/simulate", "status 500")))
				.unwrap();
			pool.run_until_stalled();
			assert_eq!(agent_ids(store), Some(vec![1]));
			assert!(!store.is_loading().get_untracked());
			assert!(!store.is_simulating().get_untracked());
			assert_eq!(store.progress().get_untracked(), 0);
			assert_eq!(timer.live_intervals(), 0);
		});
	}

	#[test]
	fn test_stop_drops_late_result() {
		Owner::new().with(|| {
			let store = StateStore::new();
			let timer = ManualTimer::default();
			let progress = progress_slot(&timer);
			let (service, reply) = pending();
			let mut pool = LocalPool::new();
			pool.spawner()
				.spawn_local(run_simulation(service, store, progress))
				.unwrap();
			pool.run_until_stalled();
			timer.fire();

			stop_simulation(store, progress);
			assert!(!store.is_loading().get_untracked());
			assert!(!store.is_simulating().get_untracked());
			assert_eq!(store.progress().get_untracked(), 0);
			assert_eq!(timer.live_intervals(), 0);

			reply.send(Ok(results(3))).unwrap();
			pool.run_until_stalled();
			assert_eq!(agent_ids(store), None);
			assert!(!store.is_simulating().get_untracked());
		});
	}

	#[test]
	fn test_stop_clears_previous_results() {
		Owner::new().with(|| {
			let store = StateStore::new();
			let ticket = store.begin_request(Channel::Simulation);
			assert!(store.replace_results(ticket, results(1)));
			store.set_simulating(true);

			let timer = ManualTimer::default();
			stop_simulation(store, progress_slot(&timer));
			assert_eq!(agent_ids(store), None);
			assert!(store.highlight().get_untracked().is_none());
			assert!(!store.is_simulating().get_untracked());
		});
	}

	#[test]
	fn test_disposing_slot_cancels_timer() {
		Owner::new().with(|| {
			let store = StateStore::new();
			let timer = ManualTimer::default();
			let progress = progress_slot(&timer);
			let (service, reply) = pending();
			let mut pool = LocalPool::new();
			pool.spawner()
				.spawn_local(run_simulation(service, store, progress))
				.unwrap();
			pool.run_until_stalled();
			assert_eq!(timer.live_intervals(), 1);

			progress.dispose();
			assert_eq!(timer.live_intervals(), 0);

			reply.send(Ok(results(2))).unwrap();
			pool.run_until_stalled();
			assert_eq!(store.progress().get_untracked(), 0);
			assert!(!store.is_loading().get_untracked());
		});
	}

	#[test]
	fn test_initial_fetches_run_together() {
		Owner::new().with(|| {
			let store = StateStore::new();
			let (map_tx, map_rx) = oneshot::channel();
			let (parcels_tx, parcels_rx) = oneshot::channel();
			let (agents_tx, agents_rx) = oneshot::channel();
			let service = PendingService {
				map: RefCell::new(Some(map_rx)),
				parcels: RefCell::new(Some(parcels_rx)),
				agents: RefCell::new(Some(agents_rx)),
				..Default::default()
			};
			let polled = Rc::clone(&service.polled);
			let mut pool = LocalPool::new();
			pool.spawner()
				.spawn_local(load_initial(service, store))
				.unwrap();

			pool.run_until_stalled();
			assert_eq!(*polled.borrow(), vec!["/map", "/parcels", "/agents"]);

			// A failed map leaves the other two unaffected.
			assert!(map_tx.send(Err(ClientError::request("/map", "status 503"))).is_ok());
			let parcel = Parcel { id: 4, location: 0 };
			assert!(agents_tx.send(Ok(Vec::new())).is_ok());
			assert!(parcels_tx.send(Ok(vec![parcel])).is_ok());
			pool.run_until_stalled();
			assert!(store.graph().get_untracked().is_empty());
			assert_eq!(*store.parcels().get_untracked(), vec![parcel]);
			assert!(store.agents().get_untracked().is_empty());
		});
	}
}
