pub mod app;
pub mod config;
pub mod gateway;
pub mod members;
pub mod shared;
pub mod tui;
pub mod wizard;
