//! Action request handlers.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value;

use nlpthing_domain::action::ActionSnapshot;
use nlpthing_domain::error::{ActionError, NotFoundError, ValidationError};
use nlpthing_domain::id::ActionId;

use crate::error::ApiError;
use crate::state::AppState;

/// One entry of an action request body: `{ "<name>": { "input": {...} } }`.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub input: Value,
}

/// Request body: exactly one action name mapped to its request.
pub type ActionRequestBody = BTreeMap<String, ActionRequest>;

/// Possible responses from the request endpoints.
pub enum RequestResponse {
    Created(Json<Value>),
}

impl IntoResponse for RequestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /actions` — every tracked action, oldest first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let actions = state.thing.list_actions(None)?;
    Ok(Json(describe(&actions)))
}

/// `GET /actions/{name}`
pub async fn list_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let actions = state.thing.list_actions(Some(&name))?;
    Ok(Json(describe(&actions)))
}

/// `POST /actions`
pub async fn request(
    State(state): State<AppState>,
    Json(body): Json<ActionRequestBody>,
) -> Result<RequestResponse, ApiError> {
    let (name, request) = single_request(body)?;
    invoke(&state, &name, request.input)
}

/// `POST /actions/{name}` — the body must name the same action as the path.
pub async fn request_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<ActionRequestBody>,
) -> Result<RequestResponse, ApiError> {
    let (requested, request) = single_request(body)?;
    if requested != name {
        return Err(ValidationError::InvalidRequest("action name does not match the path").into());
    }
    invoke(&state, &name, request.input)
}

/// `GET /actions/{name}/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let snapshot = state.thing.action_status(&name, parse_id(&id)?)?;
    Ok(Json(snapshot.to_description()))
}

/// `POST /actions/{name}/{id}/cancel` — request cooperative cancellation.
///
/// Answers with the action description: `cancelled` for an action that had
/// not started, `running` when the handler is still finishing.
pub async fn cancel(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.thing.action_status(&name, id)?;
    state.thing.cancel_action(id)?;
    let snapshot = state.thing.action_status(&name, id)?;
    Ok(Json(snapshot.to_description()))
}

/// `DELETE /actions/{name}/{id}` — cancel if still active, then forget.
pub async fn remove(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<DeleteResponse, ApiError> {
    state.thing.remove_action(&name, parse_id(&id)?)?;
    Ok(DeleteResponse::NoContent)
}

fn invoke(state: &AppState, name: &str, input: Value) -> Result<RequestResponse, ApiError> {
    let snapshot = state.thing.request(name, input)?;
    Ok(RequestResponse::Created(Json(snapshot.to_description())))
}

fn single_request(body: ActionRequestBody) -> Result<(String, ActionRequest), ValidationError> {
    if body.len() != 1 {
        return Err(ValidationError::InvalidRequest(
            "body must name exactly one action",
        ));
    }
    body.into_iter()
        .next()
        .ok_or(ValidationError::InvalidRequest("body must name exactly one action"))
}

fn parse_id(id: &str) -> Result<ActionId, ActionError> {
    ActionId::from_str(id).map_err(|_| {
        NotFoundError {
            entity: "ActionRequest",
            id: id.to_string(),
        }
        .into()
    })
}

fn describe(actions: &[ActionSnapshot]) -> Vec<Value> {
    actions.iter().map(ActionSnapshot::to_description).collect()
}
