//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin wrappers over `DetectionService`. The service blocks
//! (a single utterance plays on the calling thread, `stop` joins the alert
//! worker), so every call goes through [`run_blocking`].

pub mod api;
pub mod page;

use crate::bootstrap::AxumContext;
use crate::error::HttpError;
use crate::state::AppState;

/// Run `f` against the context on the blocking pool.
pub async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, HttpError>
where
    F: FnOnce(&AxumContext) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = AppState::clone(state);
    Ok(tokio::task::spawn_blocking(move || f(&state)).await?)
}
