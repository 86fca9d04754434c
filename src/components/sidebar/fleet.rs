use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;

use crate::actions;
use crate::api::ApiClient;
use crate::picking::{NODE_PICKED_EVENT, picked_node};
use crate::route::{Agent, Parcel};
use crate::store::StateStore;

/// Parcels with their drop-off nodes. "Move" arms picking mode; the next
/// node picked on the map becomes that parcel's new location.
#[component]
pub fn ParcelList() -> impl IntoView {
	let store = expect_context::<StateStore>();
	let api = expect_context::<ApiClient>();
	let relocating = RwSignal::new(None::<u32>);

	let listener_api = api.clone();
	let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
		let (Some(parcel_id), Some(node)) = (relocating.get_untracked(), picked_node(&ev)) else {
			return;
		};
		let parcels: Vec<Parcel> = store
			.parcels()
			.get_untracked()
			.iter()
			.map(|p| {
				if p.id == parcel_id {
					Parcel {
						location: node.id,
						..*p
					}
				} else {
					*p
				}
			})
			.collect();
		relocating.set(None);
		store.set_picking(false);
		spawn_local(actions::update_parcels(listener_api.clone(), store, parcels));
	});
	if let Some(document) = web_sys::window().and_then(|w| w.document()) {
		let _ = document
			.add_event_listener_with_callback(NODE_PICKED_EVENT, listener.as_ref().unchecked_ref());
	}
	let listener = StoredValue::new_local(listener);
	on_cleanup(move || {
		listener.try_with_value(|cb| {
			if let Some(document) = web_sys::window().and_then(|w| w.document()) {
				let _ = document.remove_event_listener_with_callback(
					NODE_PICKED_EVENT,
					cb.as_ref().unchecked_ref(),
				);
			}
		});
	});

	let rows = move || {
		store
			.parcels()
			.get()
			.iter()
			.map(|parcel| {
				let id = parcel.id;
				let armed = move || relocating.get() == Some(id);
				view! {
					<li class="parcel-row">
						<span>{format!("Parcel {} → node {}", id, parcel.location)}</span>
						<button
							class=move || if armed() { "active" } else { "" }
							on:click=move |_| {
								if armed() {
									relocating.set(None);
									store.set_picking(false);
								} else {
									relocating.set(Some(id));
									store.set_picking(true);
								}
							}
						>
							{move || if armed() { "Pick a node…" } else { "Move" }}
						</button>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<details class="fleet parcels">
			<summary>{move || format!("Parcels ({})", store.parcels().get().len())}</summary>
			<ul>{rows}</ul>
		</details>
	}
}

/// Agents with editable limits; every edit is sent to the service, which
/// echoes the stored fleet back.
#[component]
pub fn AgentList() -> impl IntoView {
	let store = expect_context::<StateStore>();
	let api = expect_context::<ApiClient>();

	let submit = move |edited: Agent| {
		let agents: Vec<Agent> = store
			.agents()
			.get_untracked()
			.iter()
			.map(|a| if a.id == edited.id { edited } else { *a })
			.collect();
		spawn_local(actions::update_agents(api.clone(), store, agents));
	};

	let rows = move || {
		let submit = submit.clone();
		store
			.agents()
			.get()
			.iter()
			.copied()
			.map(|agent| {
				let (submit_capacity, submit_dist) = (submit.clone(), submit.clone());
				view! {
					<li class="agent-row">
						<span>{format!("Agent {}", agent.id)}</span>
						<label>
							"Capacity "
							<input
								type="number"
								min="1"
								prop:value=agent.max_capacity.to_string()
								on:change=move |ev| {
									match event_target_value(&ev).parse::<u32>() {
										Ok(max_capacity) => submit_capacity(Agent { max_capacity, ..agent }),
										Err(err) => log::warn!("ignoring capacity input: {err}"),
									}
								}
							/>
						</label>
						<label>
							"Distance "
							<input
								type="number"
								min="0"
								prop:value=format!("{:.0}", agent.max_dist)
								on:change=move |ev| {
									match event_target_value(&ev).parse::<f64>() {
										Ok(max_dist) => submit_dist(Agent { max_dist, ..agent }),
										Err(err) => log::warn!("ignoring distance input: {err}"),
									}
								}
							/>
						</label>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<details class="fleet agents">
			<summary>{move || format!("Agents ({})", store.agents().get().len())}</summary>
			<ul>{rows}</ul>
		</details>
	}
}
