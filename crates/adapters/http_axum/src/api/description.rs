//! Thing description handler.

use axum::Json;
use axum::extract::State;

use nlpthing_domain::thing::ThingDescription;

use crate::state::AppState;

/// `GET /` — the thing description document.
pub async fn get(State(state): State<AppState>) -> Json<ThingDescription> {
    Json(state.thing.description())
}
