use leptos::prelude::*;

use crate::store::StateStore;

/// What the hovered agent loads at each depot visit.
#[component]
pub fn PickupLegend() -> impl IntoView {
	let store = expect_context::<StateStore>();

	move || {
		store.highlight().get().map(|highlight| {
			let chips = highlight
				.depot_groups()
				.iter()
				.map(|group| view! { <div class="legend-chip">{group.label.clone()}</div> })
				.collect_view();
			view! {
				<div class="pickup-legend">
					<div class="legend-chip legend-title">"Warehouse Pickup Order"</div>
					{chips}
				</div>
			}
		})
	}
}

/// Blocks the map while routes are computed and shows the simulated progress.
#[component]
pub fn LoadingOverlay() -> impl IntoView {
	let store = expect_context::<StateStore>();

	view! {
		<Show when=move || store.is_loading().get()>
			<div class="loading-overlay">
				<p>"Calculating routes…"</p>
				<progress max="100" value=move || store.progress().get().to_string() />
				<span>{move || format!("{}%", store.progress().get())}</span>
			</div>
		</Show>
	}
}
