//! Web Thing REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod description;
#[allow(clippy::missing_errors_doc)]
pub mod properties;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the Web Thing sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(description::get))
        .route("/properties", get(properties::list))
        .route(
            "/properties/{name}",
            get(properties::get).put(properties::put),
        )
        .route("/actions", get(actions::list).post(actions::request))
        .route(
            "/actions/{name}",
            get(actions::list_named).post(actions::request_named),
        )
        .route(
            "/actions/{name}/{id}",
            get(actions::get).delete(actions::remove),
        )
        .route("/actions/{name}/{id}/cancel", post(actions::cancel))
        .route("/events/stream", get(sse::stream))
}
