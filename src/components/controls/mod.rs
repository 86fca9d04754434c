mod component;

pub use component::ControlButtons;
