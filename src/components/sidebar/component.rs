use leptos::prelude::*;

use super::fleet::{AgentList, ParcelList};
use crate::highlight::HighlightResolver;
use crate::route::{CalcResult, Stop};
use crate::store::StateStore;

/// Right-hand panel: route summary, per-agent cards, parcels and agents.
#[component]
pub fn SimulatorSidebar() -> impl IntoView {
	let store = expect_context::<StateStore>();

	let results = move || {
		store.results().get().map(|results| {
			let summary = results.summary;
			let cards = results
				.per_agent
				.iter()
				.cloned()
				.map(|result| view! { <AgentCard result=result /> })
				.collect_view();
			view! {
				<section class="results">
					<h2>"Summary:"</h2>
					<div class="summary">
						<p>{format!("Total Distance Travelled: {:.0}", summary.total_distance)}</p>
						<p>{format!("Total Parcels Delivered: {}", summary.total_parcels)}</p>
					</div>
					<hr />
					<h2>"Calculated Routes:"</h2>
					{cards}
				</section>
			}
		})
	};

	view! {
		<aside class="sidebar">
			{results}
			<ParcelList />
			<AgentList />
		</aside>
	}
}

/// Hovering a card highlights that agent's route on the map.
#[component]
fn AgentCard(result: CalcResult) -> impl IntoView {
	let resolver = HighlightResolver::new(expect_context::<StateStore>());
	let agent = result.agent;

	let performance = match result.performance {
		Some(perf) => view! {
			<p>{format!("Distance Travelled: {:.0}m", perf.distance_travelled)}</p>
			<p>{format!("Parcels Delivered: {}", perf.parcels_delivered)}</p>
		}
		.into_any(),
		None => view! { <p class="agent-invalid">"Agent is not valid"</p> }.into_any(),
	};

	let stops = result
		.route
		.iter()
		.map(|stop| match stop {
			Stop::Depot => view! {
				<li class="stop depot">
					<span class="stop-node">"0"</span>
					<span>"Pick up parcels from warehouse"</span>
				</li>
			}
			.into_any(),
			Stop::DropOff(parcel) => view! {
				<li class="stop drop-off">
					<span class="stop-node">{parcel.location}</span>
					<span>{format!("Drop off Parcel {}", parcel.id)}</span>
				</li>
			}
			.into_any(),
		})
		.collect_view();

	view! {
		<div
			class="agent-card"
			style=format!("border-left-color: {}", result.color)
			on:pointerenter=move |_| resolver.set_hover(agent.id)
			on:pointerleave=move |_| resolver.clear_hover()
		>
			<h3>{format!("Agent {}", agent.id)}</h3>
			<div class="agent-limits">
				<p>{format!("Max Capacity: {}", agent.max_capacity)}</p>
				<p>{format!("Max Distance: {:.0}m", agent.max_dist)}</p>
			</div>
			<div class="agent-performance">{performance}</div>
			<details>
				<summary>"Routes"</summary>
				<ol class="route-stops">{stops}</ol>
			</details>
		</div>
	}
}
