//! Route-computation results and the per-route index used for highlighting
//! and pickup labels.
//!
//! `path` is authoritative for which nodes and edges a route touches;
//! `route` is authoritative for what is picked up and dropped off.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::graph::{Edge, encode_color};

/// Prefix for every parcel id in pickup and drop-off labels.
pub const PICKUP_GLYPH: &str = "📦";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parcel {
	pub id: u32,
	/// Drop-off node id.
	pub location: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
	pub id: u32,
	pub max_capacity: u32,
	pub max_dist: f64,
}

/// One entry of a route. On the wire a depot return is `null`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Parcel>", into = "Option<Parcel>")]
pub enum Stop {
	Depot,
	DropOff(Parcel),
}

impl From<Option<Parcel>> for Stop {
	fn from(value: Option<Parcel>) -> Self {
		value.map_or(Stop::Depot, Stop::DropOff)
	}
}

impl From<Stop> for Option<Parcel> {
	fn from(stop: Stop) -> Self {
		match stop {
			Stop::Depot => None,
			Stop::DropOff(parcel) => Some(parcel),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Performance {
	pub distance_travelled: f64,
	pub parcels_delivered: u32,
}

/// One agent's computed route. `performance` is absent when the route is
/// infeasible for the agent's capacity or distance limit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CalcResult {
	pub agent: Agent,
	pub route: Vec<Stop>,
	pub path: Vec<usize>,
	#[serde(deserialize_with = "display_color")]
	pub color: String,
	#[serde(default)]
	pub performance: Option<Performance>,
}

impl CalcResult {
	pub fn is_feasible(&self) -> bool {
		self.performance.is_some()
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct ResultsSummary {
	pub total_distance: f64,
	pub total_parcels: u32,
}

/// Body of `GET /simulate`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SimulationResults {
	pub per_agent: Vec<CalcResult>,
	pub summary: ResultsSummary,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireColor {
	Hex(String),
	Rgb([u8; 3]),
}

fn display_color<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match WireColor::deserialize(deserializer)? {
		WireColor::Hex(hex) if hex.starts_with('#') => hex,
		WireColor::Hex(hex) => format!("#{hex}"),
		WireColor::Rgb(rgb) => encode_color(rgb),
	})
}

/// Parcels picked up during one depot visit, as legend text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepotGroup {
	pub label: String,
}

/// Parcels dropped at one node, as map annotation text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationLabel {
	pub location: usize,
	pub label: String,
}

/// Everything the view derives from a single agent's route.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteIndex {
	pub visited_nodes: HashSet<usize>,
	pub visited_edges: HashSet<Edge>,
	pub depot_groups: Vec<DepotGroup>,
	pub location_labels: Vec<LocationLabel>,
}

pub fn index_route(route: &[Stop], path: &[usize]) -> RouteIndex {
	RouteIndex {
		visited_nodes: path.iter().copied().collect(),
		visited_edges: path_edges(path),
		depot_groups: depot_groups(route),
		location_labels: location_labels(route),
	}
}

/// Consecutive path pairs as canonical edges. A path that repeats a node in
/// place contributes no edge for that step.
pub fn path_edges(path: &[usize]) -> HashSet<Edge> {
	path.windows(2)
		.filter_map(|pair| Edge::new(pair[0], pair[1]))
		.collect()
}

/// Groups parcel ids by depot visit, in route order.
///
/// Parcels listed before the first depot marker belong to the initial load;
/// that group is only reported when it holds something, since every route
/// starts at the depot anyway.
pub fn depot_groups(route: &[Stop]) -> Vec<DepotGroup> {
	let mut groups = vec![DepotGroup::default()];
	for stop in route {
		match stop {
			Stop::Depot => groups.push(DepotGroup::default()),
			Stop::DropOff(parcel) => {
				if let Some(current) = groups.last_mut() {
					push_parcel(&mut current.label, parcel.id);
				}
			}
		}
	}
	if groups[0].label.is_empty() {
		groups.remove(0);
	}
	groups
}

/// Parcel ids per drop-off node, nodes in first-seen order.
pub fn location_labels(route: &[Stop]) -> Vec<LocationLabel> {
	let mut labels: Vec<LocationLabel> = Vec::new();
	let mut slot_of: HashMap<usize, usize> = HashMap::new();
	for stop in route {
		let Stop::DropOff(parcel) = stop else {
			continue;
		};
		let slot = *slot_of.entry(parcel.location).or_insert_with(|| {
			labels.push(LocationLabel {
				location: parcel.location,
				label: String::new(),
			});
			labels.len() - 1
		});
		push_parcel(&mut labels[slot].label, parcel.id);
	}
	labels
}

fn push_parcel(label: &mut String, parcel_id: u32) {
	label.push_str(PICKUP_GLYPH);
	label.push_str(&parcel_id.to_string());
}
