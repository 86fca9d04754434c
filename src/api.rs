//! HTTP client for the map, parcel, agent and route-solving service.

use std::future::Future;

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::graph::{MapGraph, MapPayload};
use crate::route::{Agent, Parcel, SimulationResults};

/// Map generation knobs. Unset fields fall back to the service defaults.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MapOptions {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seed: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub root_splits: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub turn_around_chance: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub split_chance: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_split: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_split: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_dist: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_dist: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub angle_range: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_depth: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_depth: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub merge_distance: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub return_angle_range: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ParcelOptions {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seed: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_parcels: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_parcels: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AgentOptions {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seed: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_agents: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_agents: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_capacity: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_capacity: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_dist: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_dist: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
}

impl ApiClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url: String = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	pub async fn get_map(&self) -> Result<MapGraph, ClientError> {
		let body = self.fetch("/map", Request::get(&self.url("/map"))).await?;
		decode_map("/map", &body)
	}

	pub async fn create_map(&self, options: &MapOptions) -> Result<MapGraph, ClientError> {
		let body = self.fetch_json("/map", Request::post(&self.url("/map")), options).await?;
		decode_map("/map", &body)
	}

	pub async fn get_parcels(&self) -> Result<Vec<Parcel>, ClientError> {
		let body = self.fetch("/parcels", Request::get(&self.url("/parcels"))).await?;
		decode("/parcels", &body)
	}

	pub async fn reroll_parcels(&self, options: &ParcelOptions) -> Result<Vec<Parcel>, ClientError> {
		let body = self
			.fetch_json("/parcels", Request::post(&self.url("/parcels")), options)
			.await?;
		decode("/parcels", &body)
	}

	/// The service renumbers ids and echoes what it stored.
	pub async fn update_parcels(&self, parcels: &[Parcel]) -> Result<Vec<Parcel>, ClientError> {
		let body = self
			.fetch_json("/parcels", Request::put(&self.url("/parcels")), &parcels)
			.await?;
		decode("/parcels", &body)
	}

	pub async fn get_agents(&self) -> Result<Vec<Agent>, ClientError> {
		let body = self.fetch("/agents", Request::get(&self.url("/agents"))).await?;
		decode("/agents", &body)
	}

	pub async fn reroll_agents(&self, options: &AgentOptions) -> Result<Vec<Agent>, ClientError> {
		let body = self
			.fetch_json("/agents", Request::post(&self.url("/agents")), options)
			.await?;
		decode("/agents", &body)
	}

	pub async fn update_agents(&self, agents: &[Agent]) -> Result<Vec<Agent>, ClientError> {
		let body = self
			.fetch_json("/agents", Request::put(&self.url("/agents")), &agents)
			.await?;
		decode("/agents", &body)
	}

	pub async fn simulate(&self) -> Result<SimulationResults, ClientError> {
		let body = self.fetch("/simulate", Request::get(&self.url("/simulate"))).await?;
		decode("/simulate", &body)
	}

	async fn fetch_json<B: Serialize + ?Sized>(
		&self,
		endpoint: &str,
		builder: RequestBuilder,
		body: &B,
	) -> Result<String, ClientError> {
		let request = builder
			.json(body)
			.map_err(|err| ClientError::request(endpoint, err))?;
		let response = request
			.send()
			.await
			.map_err(|err| ClientError::request(endpoint, err))?;
		read_body(endpoint, response).await
	}

	async fn fetch(&self, endpoint: &str, builder: RequestBuilder) -> Result<String, ClientError> {
		let response = builder
			.send()
			.await
			.map_err(|err| ClientError::request(endpoint, err))?;
		read_body(endpoint, response).await
	}
}

/// The service reads the fetch workflows are generic over.
pub trait RoutingService {
	fn fetch_map(&self) -> impl Future<Output = Result<MapGraph, ClientError>>;
	fn fetch_parcels(&self) -> impl Future<Output = Result<Vec<Parcel>, ClientError>>;
	fn fetch_agents(&self) -> impl Future<Output = Result<Vec<Agent>, ClientError>>;
	fn solve_routes(&self) -> impl Future<Output = Result<SimulationResults, ClientError>>;
}

impl RoutingService for ApiClient {
	fn fetch_map(&self) -> impl Future<Output = Result<MapGraph, ClientError>> {
		self.get_map()
	}

	fn fetch_parcels(&self) -> impl Future<Output = Result<Vec<Parcel>, ClientError>> {
		self.get_parcels()
	}

	fn fetch_agents(&self) -> impl Future<Output = Result<Vec<Agent>, ClientError>> {
		self.get_agents()
	}

	fn solve_routes(&self) -> impl Future<Output = Result<SimulationResults, ClientError>> {
		self.simulate()
	}
}

async fn read_body(endpoint: &str, response: Response) -> Result<String, ClientError> {
	let status = response.status();
	let body = response
		.text()
		.await
		.map_err(|err| ClientError::request(endpoint, err))?;
	if !(200..300).contains(&status) {
		return Err(ClientError::request(
			endpoint,
			format!("status {status}: {body}"),
		));
	}
	Ok(body)
}

/// Decodes a response body; an undecodable body is a failed request.
pub fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ClientError> {
	serde_json::from_str(body).map_err(|err| ClientError::request(endpoint, err))
}

/// Decodes a map body and validates it into a graph.
pub fn decode_map(endpoint: &str, body: &str) -> Result<MapGraph, ClientError> {
	let payload: MapPayload = decode(endpoint, body)?;
	Ok(payload.into_graph()?)
}
