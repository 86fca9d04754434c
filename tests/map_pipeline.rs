//! Wire bodies through decoding, state replacement and highlighting.

use leptos::reactive::owner::Owner;
use leptos::prelude::*;
use parcel_route_viewer::api::{decode, decode_map};
use parcel_route_viewer::graph::Edge;
use parcel_route_viewer::highlight::{HighlightResolver, resolve_highlight};
use parcel_route_viewer::requests::Channel;
use parcel_route_viewer::route::SimulationResults;
use parcel_route_viewer::store::StateStore;

const MAP_BODY: &str = r#"{
	"no_of_nodes": 4,
	"nodes": [
		{"id": 0, "x": 0.0, "y": 0.0, "color": [255, 0, 0], "neighbours": [1, 2]},
		{"id": 1, "x": 10.0, "y": 0.0, "color": [0, 255, 0], "neighbours": [0, 2, 3]},
		{"id": 2, "x": 5.0, "y": 8.0, "color": [0, 0, 255], "neighbours": [0, 1]},
		{"id": 3, "x": 20.0, "y": 0.0, "color": [16, 32, 48], "neighbours": [1]}
	]
}"#;

const SIMULATE_BODY: &str = r##"{
	"per_agent": [
		{
			"agent": {"id": 1, "max_capacity": 2, "max_dist": 500.0},
			"route": [null, {"id": 7, "location": 2}, {"id": 8, "location": 3}, null, {"id": 9, "location": 2}],
			"path": [0, 2, 1, 3, 1, 0, 2, 0],
			"color": [200, 10, 10],
			"performance": {"distance_travelled": 71.5, "parcels_delivered": 3}
		},
		{
			"agent": {"id": 2, "max_capacity": 1, "max_dist": 1.0},
			"route": [],
			"path": [],
			"color": "#00ff00"
		}
	],
	"summary": {"total_distance": 71.5, "total_parcels": 3}
}"##;

fn edge(a: usize, b: usize) -> Edge {
	Edge::new(a, b).unwrap()
}

#[test]
fn test_map_body_builds_undirected_graph() {
	let graph = decode_map("/map", MAP_BODY).unwrap();

	assert_eq!(graph.nodes().len(), 4);
	assert!(graph.nodes().iter().enumerate().all(|(i, n)| n.id == i));
	assert_eq!(graph.edges().len(), 4);
	for (a, b) in [(0, 1), (0, 2), (1, 2), (1, 3)] {
		assert!(graph.has_edge(&edge(b, a)));
	}
	assert_eq!(graph.node(3).unwrap().color, "#102030");
}

#[test]
fn test_simulation_body_decodes_both_colour_forms() {
	let results: SimulationResults = decode("/simulate", SIMULATE_BODY).unwrap();

	assert_eq!(results.per_agent[0].color, "#c80a0a");
	assert_eq!(results.per_agent[1].color, "#00ff00");
	assert!(results.per_agent[0].is_feasible());
	assert!(!results.per_agent[1].is_feasible());
	assert_eq!(results.summary.total_parcels, 3);
}

#[test]
fn test_highlight_follows_path_and_route() {
	let results: SimulationResults = decode("/simulate", SIMULATE_BODY).unwrap();
	let highlight = resolve_highlight(1, &results.per_agent).unwrap();

	assert!(highlight.contains_edge(&edge(1, 3)));
	assert!(highlight.contains_edge(&edge(2, 1)));
	assert!(!highlight.contains_node(4));
	let groups: Vec<&str> = highlight.depot_groups().iter().map(|g| g.label.as_str()).collect();
	assert_eq!(groups, vec!["📦7📦8", "📦9"]);
	let at_two = highlight
		.location_labels()
		.iter()
		.find(|label| label.location == 2)
		.unwrap();
	assert_eq!(at_two.label, "📦7📦9");

	assert!(resolve_highlight(99, &results.per_agent).is_none());
}

#[test]
fn test_hover_survives_new_results_for_same_agent() {
	Owner::new().with(|| {
		let store = StateStore::new();
		let resolver = HighlightResolver::new(store);
		let results: SimulationResults = decode("/simulate", SIMULATE_BODY).unwrap();

		let ticket = store.begin_request(Channel::Simulation);
		assert!(store.replace_results(ticket, results.clone()));
		resolver.set_hover(1);
		assert_eq!(store.highlight().get_untracked().unwrap().agent_id, 1);

		let mut shorter = results;
		shorter.per_agent[0].path = vec![0, 1, 0];
		let ticket = store.begin_request(Channel::Simulation);
		assert!(store.replace_results(ticket, shorter));
		let highlight = store.highlight().get_untracked().unwrap();
		assert!(highlight.contains_edge(&edge(0, 1)));
		assert!(!highlight.contains_edge(&edge(1, 3)));

		resolver.clear_hover();
		assert!(store.highlight().get_untracked().is_none());
	});
}
