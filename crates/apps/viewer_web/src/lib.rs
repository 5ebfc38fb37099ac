//! Browser entry point for the sandbox viewer.
//!
//! The page provides three stacked canvases (map, actors, signals), an
//! optional reset button, a loading overlay and an info line. JS glue owns the
//! live channel and forwards each event with [`handle_event`].

pub mod config;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod clock;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod logging;

#[cfg(target_arch = "wasm32")]
pub use app::*;
pub use config::WebConfig;
