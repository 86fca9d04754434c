//! DOM event raised when a node is clicked in picking mode.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Event};

use crate::graph::Node;

/// Name of the `CustomEvent` dispatched on `document`; `detail` is the node
/// record `{id, x, y, color}`.
pub const NODE_PICKED_EVENT: &str = "onClickNode";

pub fn dispatch_node_picked(node: &Node) -> Result<(), JsValue> {
	let detail = serde_wasm_bindgen::to_value(node)?;
	let init = CustomEventInit::new();
	init.set_detail(&detail);
	let event = CustomEvent::new_with_event_init_dict(NODE_PICKED_EVENT, &init)?;

	let document = web_sys::window()
		.and_then(|window| window.document())
		.ok_or_else(|| JsValue::from_str("no document to dispatch on"))?;
	document.dispatch_event(&event)?;
	log::debug!("picked node {}", node.id);
	Ok(())
}

/// Node record carried by a picking event, if `event` is one.
pub fn picked_node(event: &Event) -> Option<Node> {
	let event = event.dyn_ref::<CustomEvent>()?;
	serde_wasm_bindgen::from_value(event.detail()).ok()
}
