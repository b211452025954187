#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dev-dependencies used only by integration tests
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, ServerConfig, bootstrap, spawn_event_bridge, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
