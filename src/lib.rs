//! Browser client for the parcel routing service: draws the road network,
//! edits parcels and agents, and overlays computed delivery routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod highlight;
pub mod picking;
pub mod progress;
pub mod requests;
pub mod route;
pub mod store;

mod components;
mod pages;

// `rand` pulls getrandom in; its "js" backend has to be linked explicitly.
#[cfg(target_arch = "wasm32")]
use getrandom as _;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;
use crate::store::StateStore;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Root component: shared state, service client and routes.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = ClientConfig::from_env().unwrap_or_else(|err| {
		log::error!("{err}; falling back to defaults");
		ClientConfig::default()
	});
	info!("routing service at {}", config.api_base_url);

	provide_context(StateStore::new());
	provide_context(ApiClient::new(config.api_base_url.clone()));
	provide_context(config);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Parcel Route Viewer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
