//! Shared application state for axum handlers.

use std::sync::Arc;

use nlpthing_app::thing::Thing;

/// Application state shared across all axum handlers.
///
/// Only the `Arc` is cloned per request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The thing served by this adapter.
    pub thing: Arc<Thing>,
}

impl AppState {
    #[must_use]
    pub fn new(thing: Thing) -> Self {
        Self::from_arc(Arc::new(thing))
    }

    /// Use this when the thing is also shared with background tasks.
    #[must_use]
    pub fn from_arc(thing: Arc<Thing>) -> Self {
        Self { thing }
    }
}
