use crate::graph::MapGraph;

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 8.0;
pub const EDGE_THICKNESS: f64 = 2.0;
/// Pointer travel below this many pixels still counts as a click.
const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Screen-side view of the map. Map y grows upwards, screen y downwards.
pub struct MapViewState {
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	dirty: bool,
}

impl MapViewState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			pan: PanState::default(),
			width,
			height,
			dirty: true,
		}
	}

	pub fn map_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
		(
			self.transform.x + x * self.transform.k,
			self.transform.y - y * self.transform.k,
		)
	}

	pub fn screen_to_map(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(self.transform.y - sy) / self.transform.k,
		)
	}

	/// Nearest node within `HIT_RADIUS` (map units) of the pointer.
	pub fn node_at_position(&self, graph: &MapGraph, sx: f64, sy: f64) -> Option<usize> {
		let (mx, my) = self.screen_to_map(sx, sy);
		graph
			.nodes()
			.iter()
			.map(|node| (node.id, ((node.x - mx).powi(2) + (node.y - my).powi(2)).sqrt()))
			.filter(|&(_, dist)| dist < HIT_RADIUS)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(id, _)| id)
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if !self.pan.active {
			return;
		}
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
			self.pan.moved = true;
		}
		if self.pan.moved {
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
			self.dirty = true;
		}
	}

	/// Ends a pan; returns `true` when the pointer never really moved.
	pub fn end_pan(&mut self) -> bool {
		let was_click = self.pan.active && !self.pan.moved;
		self.pan = PanState::default();
		was_click
	}

	/// Zooms around the pointer so the map point under it stays put.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.5, 50.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.dirty = true;
	}

	/// Back to the initial centring and unit scale for the current size.
	pub fn reset_view(&mut self) {
		*self = Self::new(self.width, self.height);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}

	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Returns whether a redraw is due and clears the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}
