use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{EDGE_THICKNESS, MapViewState, NODE_RADIUS};
use crate::graph::{Edge, MapGraph};
use crate::highlight::Highlight;

const BACKGROUND: &str = "#1a1a2e";
const HALO: &str = "#f1f5f9";
/// Parcel labels sit this far above their node, in map units.
const LABEL_LIFT: f64 = 10.0;

/// One frame's worth of store snapshots.
pub struct Scene<'a> {
	pub graph: &'a MapGraph,
	pub highlight: Option<&'a Highlight>,
}

pub fn render(view: &MapViewState, scene: &Scene<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, view.width, view.height);

	if let Some(highlight) = scene.highlight {
		draw_edge_halos(view, scene.graph, highlight, ctx);
		draw_node_halos(view, scene.graph, highlight, ctx);
	}
	draw_edges(view, scene.graph, ctx);
	draw_nodes(view, scene.graph, ctx);
	if let Some(highlight) = scene.highlight {
		draw_parcel_labels(view, scene.graph, highlight, ctx);
	}
}

fn edge_endpoints(view: &MapViewState, graph: &MapGraph, edge: &Edge) -> Option<[(f64, f64); 2]> {
	let (a, b) = (graph.node(edge.small())?, graph.node(edge.large())?);
	Some([view.map_to_screen(a.x, a.y), view.map_to_screen(b.x, b.y)])
}

fn stroke_segment(ctx: &CanvasRenderingContext2d, [(x1, y1), (x2, y2)]: [(f64, f64); 2]) {
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2, y2);
	ctx.stroke();
}

fn draw_edge_halos(
	view: &MapViewState,
	graph: &MapGraph,
	highlight: &Highlight,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_stroke_style_str(HALO);
	ctx.set_line_width(EDGE_THICKNESS * 5.0 * view.transform.k);
	ctx.set_line_cap("round");
	for edge in highlight.edges() {
		if let Some(points) = edge_endpoints(view, graph, edge) {
			stroke_segment(ctx, points);
		}
	}
}

fn draw_node_halos(
	view: &MapViewState,
	graph: &MapGraph,
	highlight: &Highlight,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str(HALO);
	let radius = NODE_RADIUS * 3.0 * view.transform.k;
	for &id in highlight.nodes() {
		let Some(node) = graph.node(id) else {
			continue;
		};
		let (x, y) = view.map_to_screen(node.x, node.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.fill();
	}
}

fn draw_edges(view: &MapViewState, graph: &MapGraph, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_width(EDGE_THICKNESS * view.transform.k);
	ctx.set_line_cap("butt");
	for edge in graph.edges() {
		let (Some(points), Some(small)) = (edge_endpoints(view, graph, edge), graph.node(edge.small()))
		else {
			continue;
		};
		ctx.set_stroke_style_str(&small.color);
		stroke_segment(ctx, points);
	}
}

fn draw_nodes(view: &MapViewState, graph: &MapGraph, ctx: &CanvasRenderingContext2d) {
	let k = view.transform.k;
	let radius = NODE_RADIUS * k;
	// Ids only become legible once zoomed in.
	let show_ids = k >= 2.0;
	ctx.set_font(&format!("bold {}px sans-serif", 2.0 * k));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in graph.nodes() {
		let (x, y) = view.map_to_screen(node.x, node.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.color);
		ctx.fill();

		if show_ids {
			ctx.set_fill_style_str("white");
			let _ = ctx.fill_text(&node.id.to_string(), x, y);
		}
	}
}

fn draw_parcel_labels(
	view: &MapViewState,
	graph: &MapGraph,
	highlight: &Highlight,
	ctx: &CanvasRenderingContext2d,
) {
	let k = view.transform.k;
	ctx.set_font(&format!("bold {}px sans-serif", 10.0 * k.max(0.5)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_line_join("round");
	ctx.set_line_width(5.0);

	for label in highlight.location_labels() {
		let Some(node) = graph.node(label.location) else {
			continue;
		};
		let (x, y) = view.map_to_screen(node.x, node.y + LABEL_LIFT);
		ctx.set_stroke_style_str(&node.color);
		let _ = ctx.stroke_text(&label.label, x, y);
		ctx.set_fill_style_str("#ffffff");
		let _ = ctx.fill_text(&label.label, x, y);
	}
}
