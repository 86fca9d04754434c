use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render::{self, Scene};
use super::state::MapViewState;
use crate::picking::dispatch_node_picked;
use crate::store::StateStore;

/// View state shared by the frame loop and the pointer handlers. `None`
/// until the canvas is attached.
type SharedView = Rc<RefCell<Option<MapViewState>>>;

/// Browser-side callbacks registered while the canvas is mounted.
#[derive(Default)]
struct Attachments {
	frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	frame_id: Rc<Cell<Option<i32>>>,
	on_resize: Option<Closure<dyn FnMut()>>,
}

impl Attachments {
	/// Cancels the pending frame before dropping its closure, which also
	/// breaks the closure's reference to its own slot.
	fn release(&mut self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(id) = self.frame_id.take() {
			let _ = window.cancel_animation_frame(id);
		}
		self.frame.borrow_mut().take();
		if let Some(cb) = self.on_resize.take() {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}
}

fn with_view<R>(view: &SharedView, f: impl FnOnce(&mut MapViewState) -> R) -> Option<R> {
	view.borrow_mut().as_mut().map(f)
}

/// Sizes the drawing buffer to the parent element and returns that size.
fn fit_to_parent(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let (width, height) = canvas
		.parent_element()
		.map(|parent| (parent.client_width() as f64, parent.client_height() as f64))
		.unwrap_or((800.0, 600.0));
	canvas.set_width(width as u32);
	canvas.set_height(height as u32);
	(width, height)
}

fn canvas_point(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let rect = canvas_ref.get_untracked()?.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn draw(state: &MapViewState, store: StateStore, ctx: &CanvasRenderingContext2d) {
	let graph = store.graph().get_untracked();
	let highlight = store.highlight().get_untracked();
	let scene = Scene {
		graph: &graph,
		highlight: highlight.as_deref(),
	};
	render::render(state, &scene, ctx);
}

fn attach(
	canvas: HtmlCanvasElement,
	view: SharedView,
	store: StateStore,
	slots: &mut Attachments,
) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
		.dyn_into()?;
	let (width, height) = fit_to_parent(&canvas);
	*view.borrow_mut() = Some(MapViewState::new(width, height));

	let resized = view.clone();
	let on_resize = Closure::<dyn FnMut()>::new(move || {
		let (width, height) = fit_to_parent(&canvas);
		with_view(&resized, |state| state.resize(width, height));
	});
	window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
	slots.on_resize = Some(on_resize);

	// Draws only frames marked dirty; the loop itself runs every frame.
	let (frame, frame_id) = (slots.frame.clone(), slots.frame_id.clone());
	*slots.frame.borrow_mut() = Some(Closure::new(move || {
		with_view(&view, |state| {
			if state.take_dirty() {
				draw(state, store, &ctx);
			}
		});
		let next = web_sys::window()
			.zip(frame.borrow().as_ref())
			.and_then(|(win, cb)| win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		frame_id.set(next);
	}));
	let first = slots
		.frame
		.borrow()
		.as_ref()
		.map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()))
		.transpose()?;
	slots.frame_id.set(first);
	Ok(())
}

/// Road network, parcels and the hovered agent's route on a 2D canvas.
///
/// Dragging pans, the wheel zooms about the pointer. In picking mode a click
/// that did not drag selects the nearest node and announces it on `document`.
#[component]
pub fn MapCanvas() -> impl IntoView {
	let store = expect_context::<StateStore>();
	let canvas_ref = NodeRef::<Canvas>::new();
	let view: SharedView = Rc::new(RefCell::new(None));
	let attachments = StoredValue::new_local(Attachments::default());

	let mounted = view.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		attachments.update_value(|slots| {
			slots.release();
			if let Err(err) = attach(canvas, mounted.clone(), store, slots) {
				log::error!("map canvas setup failed: {err:?}");
			}
		});
	});
	on_cleanup(move || {
		attachments.try_update_value(Attachments::release);
	});

	let invalidated = view.clone();
	Effect::new(move |_| {
		store.graph().track();
		store.highlight().track();
		with_view(&invalidated, MapViewState::mark_dirty);
	});

	let pressed = view.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			with_view(&pressed, |state| state.begin_pan(x, y));
		}
	};

	let dragged = view.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			with_view(&dragged, |state| state.pan_to(x, y));
		}
	};

	let released = view.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let was_click = with_view(&released, MapViewState::end_pan).unwrap_or(false);
		if !was_click || !store.is_picking().get_untracked() {
			return;
		}
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let graph = store.graph().get_untracked();
		let picked = with_view(&released, |state| state.node_at_position(&graph, x, y))
			.flatten()
			.and_then(|id| graph.node(id));
		if let Some(Err(err)) = picked.map(dispatch_node_picked) {
			log::warn!("dispatching node pick: {err:?}");
		}
	};

	let left = view.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_view(&left, MapViewState::end_pan);
	};

	let recentred = view.clone();
	let on_reset = move |_| {
		with_view(&recentred, MapViewState::reset_view);
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			with_view(&view, |state| state.zoom_at(x, y, ev.delta_y()));
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="map-canvas"
			class:picking=move || store.is_picking().get()
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
		/>
		<button class="reset-view" title="Reset view" on:click=on_reset>
			"⌂"
		</button>
	}
}
