//! # nlpthing-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **Web Thing REST API**: the thing description at `/`,
//!   property reads and writes under `/properties`, action requests under
//!   `/actions`
//! - Push `propertyStatus` / `actionStatus` messages over **server-sent
//!   events** at `/events/stream`
//! - Map HTTP requests into [`Thing`](nlpthing_app::thing::Thing) calls
//!   (driving adapter) and errors into status codes
//!
//! ## Dependency rule
//! Depends on `nlpthing-app` (for the thing runtime) and `nlpthing-domain`
//! (for types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use axum::response::Response;
    use http_body_util::BodyExt;

    use nlpthing_app::action::ActionContext;
    use nlpthing_app::action_registry::ActionDescriptor;
    use nlpthing_app::thing::Thing;
    use nlpthing_domain::id::ActionId;
    use nlpthing_domain::property::PropertyMetadata;
    use nlpthing_domain::schema::{FieldSchema, InputSchema};
    use nlpthing_domain::thing::ThingInfo;
    use nlpthing_domain::value::{PropertyValue, ValueType};

    use crate::state::AppState;

    /// A thing with a writable `count`, a read-only `label` and an
    /// `increment` action adding `by` to `count`.
    pub fn counter_state() -> AppState {
        let increment = ActionDescriptor::builder("increment")
            .title("Increment")
            .input(
                InputSchema::builder()
                    .required("by", FieldSchema::new(ValueType::Integer).minimum(1.0))
                    .build(),
            )
            .handler(|ctx: ActionContext| async move {
                let by = ctx
                    .u64_field("by")
                    .and_then(|n| i64::try_from(n).ok())
                    .unwrap_or(1);
                let current = match ctx.read_property("count")? {
                    PropertyValue::Integer(n) => n,
                    _ => 0,
                };
                ctx.write_property("count", current + by)
            })
            .build()
            .unwrap();

        let thing = Thing::builder(
            ThingInfo::builder()
                .id("urn:test:counter")
                .title("Counter")
                .semantic_type("Counter")
                .build()
                .unwrap(),
        )
        .property(
            "count",
            0_i64,
            PropertyMetadata::builder(ValueType::Integer)
                .title("Count")
                .minimum(0.0)
                .build()
                .unwrap(),
        )
        .property(
            "label",
            "counter",
            PropertyMetadata::builder(ValueType::String)
                .title("Label")
                .read_only(true)
                .build()
                .unwrap(),
        )
        .action(increment)
        .build()
        .unwrap();

        AppState::new(thing)
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub async fn wait_terminal(state: &AppState, id: ActionId) {
        for _ in 0..200 {
            if state
                .thing
                .action_status_by_id(id)
                .is_ok_and(|snapshot| snapshot.status.is_terminal())
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("action {id} did not finish");
    }
}
