//! Route modules and the top-level router.

use axum::Router;

use crate::state::AppState;

pub mod callback;
pub mod generation;
pub mod health;
pub mod history;

/// All routes, without middleware (the binary layers those on).
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(callback::router())
        .nest("/api/v1", generation::router().merge(history::router()))
}
