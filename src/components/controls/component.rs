use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions::{self, ProgressHandle};
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::store::StateStore;

/// Regenerate, picking-mode and simulate/stop buttons.
#[component]
pub fn ControlButtons() -> impl IntoView {
	let store = expect_context::<StateStore>();
	let api = expect_context::<ApiClient>();
	let config = expect_context::<ClientConfig>();

	// Owned here so that unmounting drops the run and stops its timer.
	let progress: ProgressHandle = StoredValue::new_local(actions::new_progress(&config.progress));
	on_cleanup(move || {
		progress.try_update_value(|run| run.settle());
	});

	let regenerate_api = api.clone();
	let on_regenerate = move |_| {
		spawn_local(actions::regenerate(regenerate_api.clone(), store));
	};

	let on_simulate = move |_| {
		if store.is_simulating().get_untracked() {
			actions::stop_simulation(store, progress);
		} else {
			spawn_local(actions::run_simulation(api.clone(), store, progress));
		}
	};

	let busy = move || store.is_loading().get();

	view! {
		<div class="control-buttons">
			<button title="Regenerate map, parcels and agents" disabled=busy on:click=on_regenerate>
				"⟳"
			</button>
			<button
				title="Pick nodes on the map"
				class=move || if store.is_picking().get() { "active" } else { "" }
				on:click=move |_| store.toggle_picking()
			>
				"P"
			</button>
			<button
				title="Compute routes"
				class=move || if store.is_simulating().get() { "destructive" } else { "secondary" }
				on:click=on_simulate
			>
				{move || if store.is_simulating().get() { "■" } else { "▶" }}
			</button>
		</div>
	}
}
