//! Property handlers.
//!
//! Values travel as `{ "<name>": <value> }` objects, both ways.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Map, Value};

use nlpthing_domain::error::ValidationError;
use nlpthing_domain::value::PropertyValue;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /properties` — every property value keyed by name.
pub async fn list(State(state): State<AppState>) -> Json<Map<String, Value>> {
    let values = state
        .thing
        .properties()
        .values()
        .into_iter()
        .map(|(name, value)| (name, value.to_json()))
        .collect();
    Json(values)
}

/// `GET /properties/{name}`
pub async fn get(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = state.thing.read_property(&name)?;
    Ok(Json(single(name, &value)))
}

/// `PUT /properties/{name}` — validated write, echoing the stored value.
pub async fn put(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.thing.read_property(&name)?;
    let value = body
        .get(&name)
        .cloned()
        .ok_or(ValidationError::InvalidRequest(
            "body must be an object keyed by the property name",
        ))?;

    state
        .thing
        .write_property_remote(&name, PropertyValue::from(value))?;
    let stored = state.thing.read_property(&name)?;
    Ok(Json(single(name, &stored)))
}

fn single(name: String, value: &PropertyValue) -> Value {
    let mut map = Map::new();
    map.insert(name, value.to_json());
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use crate::router;
    use crate::testing::{body_json, counter_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn put(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_list_every_property() {
        let app = router::build(counter_state());

        let response = app
            .oneshot(Request::builder().uri("/properties").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"count": 0, "label": "counter"})
        );
    }

    #[tokio::test]
    async fn should_return_single_property() {
        let app = router::build(counter_state());

        let response = app
            .oneshot(Request::builder().uri("/properties/count").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(body_json(response).await, serde_json::json!({"count": 0}));
    }

    #[tokio::test]
    async fn should_return_404_when_property_unknown() {
        let app = router::build(counter_state());

        let response = app
            .oneshot(Request::builder().uri("/properties/color").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_write_and_echo_value() {
        let state = counter_state();
        let app = router::build(state.clone());

        let response = app
            .oneshot(put("/properties/count", r#"{"count": 4}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"count": 4}));
        assert_eq!(
            state.thing.read_property("count").unwrap(),
            nlpthing_domain::value::PropertyValue::Integer(4)
        );
    }

    #[tokio::test]
    async fn should_return_400_when_value_invalid() {
        let app = router::build(counter_state());

        let response = app
            .oneshot(put("/properties/count", r#"{"count": -1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_400_when_body_misses_name() {
        let app = router::build(counter_state());

        let response = app
            .oneshot(put("/properties/count", r#"{"value": 4}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_403_when_property_read_only() {
        let app = router::build(counter_state());

        let response = app
            .oneshot(put("/properties/label", r#"{"label": "x"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
