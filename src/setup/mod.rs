pub mod actions;
pub mod fields;
pub mod gate;
pub mod navigation;
pub mod screens;
pub mod state;
pub mod steps;
pub mod validate;
