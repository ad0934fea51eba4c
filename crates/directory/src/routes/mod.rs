//! HTTP route handlers.

pub mod directory;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Application router without middleware layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(directory::router())
        .merge(health::router())
        .with_state(state)
}
