#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

pub mod api;
pub mod chips;
pub mod components;
pub mod constants;
pub mod geometry;
pub mod logging;
pub mod markers;
pub mod models;
pub mod popup;
pub mod settings;

pub use components::app::App;
