pub mod controls;
pub mod map_canvas;
pub mod overlays;
pub mod sidebar;
