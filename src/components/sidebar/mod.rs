mod component;
mod fleet;

pub use component::SimulatorSidebar;
