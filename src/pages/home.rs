use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions;
use crate::api::ApiClient;
use crate::components::controls::ControlButtons;
use crate::components::map_canvas::MapCanvas;
use crate::components::overlays::{LoadingOverlay, PickupLegend};
use crate::components::sidebar::SimulatorSidebar;
use crate::store::StateStore;

/// Map with its overlays on the left, simulator panel on the right.
#[component]
pub fn Home() -> impl IntoView {
	let store = expect_context::<StateStore>();
	let api = expect_context::<ApiClient>();

	Effect::new(move |_| {
		spawn_local(actions::load_initial(api.clone(), store));
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="viewer">
				<div class="map-pane">
					<MapCanvas />
					<PickupLegend />
					<ControlButtons />
					<LoadingOverlay />
				</div>
				<SimulatorSidebar />
			</div>
		</ErrorBoundary>
	}
}
