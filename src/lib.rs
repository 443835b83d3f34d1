pub mod admin;
pub mod app;
pub mod config;
pub mod setup;
pub mod shared;
pub mod submit;
