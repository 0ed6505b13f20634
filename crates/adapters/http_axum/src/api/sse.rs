//! Server-Sent Events (SSE) stream of thing events.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

/// `GET /events/stream` — `propertyStatus` and `actionStatus` messages.
///
/// Each thing event becomes one SSE frame whose `event:` field is the
/// message type and whose `data:` is the JSON message. The stream lasts
/// until the client disconnects.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let events = BroadcastStream::new(state.thing.subscribe()).filter_map(|result| match result {
        Ok(event) => Some(Ok(Event::default()
            .event(event.message_type())
            .data(event.to_message().to_string()))),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
