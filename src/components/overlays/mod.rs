mod component;

pub use component::{LoadingOverlay, PickupLegend};
