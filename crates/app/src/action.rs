//! Action — one invocation of a thing's capability.
//!
//! An [`Action`] is single-use: it is created `Pending`, run at most once by
//! the executor, and ends in exactly one terminal status. Its handler
//! produces no return value; results flow out through property writes on the
//! [`ActionContext`].

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use nlpthing_domain::action::{ActionSnapshot, ActionStatus};
use nlpthing_domain::error::{ActionError, ActionExecutionError};
use nlpthing_domain::event::ThingEvent;
use nlpthing_domain::id::ActionId;
use nlpthing_domain::time::{Timestamp, elapsed_ms, now};
use nlpthing_domain::value::PropertyValue;

use crate::lock;
use crate::ports::EventPublisher;
use crate::property_store::PropertyStore;

/// Boxed future returned by an [`ActionHandler`].
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<(), ActionExecutionError>> + Send>>;

/// The computation bound to an action name.
pub type ActionHandler = Arc<dyn Fn(ActionContext) -> ActionFuture + Send + Sync>;

/// Cooperative cancellation flag shared between an action and its handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a handler may touch while it runs.
pub struct ActionContext {
    id: ActionId,
    name: String,
    input: Arc<serde_json::Value>,
    properties: Weak<PropertyStore>,
    cancel: CancelFlag,
}

impl ActionContext {
    #[must_use]
    pub fn id(&self) -> ActionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn input(&self) -> &serde_json::Value {
        &self.input
    }

    /// String field of the input.
    ///
    /// # Errors
    ///
    /// Returns [`ActionExecutionError::Input`] if the field is missing or not a string.
    pub fn str_field(&self, field: &str) -> Result<&str, ActionExecutionError> {
        self.input
            .get(field)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ActionExecutionError::Input(field.to_string()))
    }

    /// Non-negative integer field of the input, if present.
    ///
    /// Integral floats such as `3.0` count as integers, as they do for
    /// schema validation.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn u64_field(&self, field: &str) -> Option<u64> {
        let value = self.input.get(field)?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        })
    }

    /// A clone of the cancellation flag, for checks inside blocking work.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Safe point: bail out if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`ActionExecutionError::Cancelled`] once the action is cancelled.
    pub fn checkpoint(&self) -> Result<(), ActionExecutionError> {
        if self.is_cancelled() {
            return Err(ActionExecutionError::Cancelled);
        }
        Ok(())
    }

    /// Read a property of the owning thing.
    ///
    /// # Errors
    ///
    /// Returns [`ActionExecutionError::ThingGone`] if the thing was dropped,
    /// or the store's [`PropertyError`](nlpthing_domain::error::PropertyError).
    pub fn read_property(&self, name: &str) -> Result<PropertyValue, ActionExecutionError> {
        let store = self
            .properties
            .upgrade()
            .ok_or(ActionExecutionError::ThingGone)?;
        Ok(store.read(name)?)
    }

    /// Write a property of the owning thing. This is the action's only output channel.
    ///
    /// # Errors
    ///
    /// Returns [`ActionExecutionError::ThingGone`] if the thing was dropped,
    /// or the store's [`PropertyError`](nlpthing_domain::error::PropertyError).
    pub fn write_property(
        &self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ActionExecutionError> {
        let store = self
            .properties
            .upgrade()
            .ok_or(ActionExecutionError::ThingGone)?;
        store.write(name, value.into())?;
        Ok(())
    }
}

#[derive(Debug)]
struct Record {
    status: ActionStatus,
    time_requested: Timestamp,
    time_started: Option<Timestamp>,
    time_completed: Option<Timestamp>,
    error: Option<String>,
}

impl Record {
    fn transition(&mut self, next: ActionStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        if next == ActionStatus::Running {
            self.time_started = Some(now());
        } else if next.is_terminal() {
            self.time_completed = Some(now());
        }
        self.status = next;
        true
    }
}

/// One invocation instance.
pub struct Action {
    id: ActionId,
    name: String,
    input: Arc<serde_json::Value>,
    properties: Weak<PropertyStore>,
    handler: ActionHandler,
    cancel: CancelFlag,
    record: Mutex<Record>,
}

impl Action {
    /// Create a pending action. `input` is snapshotted and never changes.
    pub fn new(
        name: impl Into<String>,
        input: serde_json::Value,
        properties: Weak<PropertyStore>,
        handler: ActionHandler,
    ) -> Self {
        Self {
            id: ActionId::new(),
            name: name.into(),
            input: Arc::new(input),
            properties,
            handler,
            cancel: CancelFlag::default(),
            record: Mutex::new(Record {
                status: ActionStatus::Pending,
                time_requested: now(),
                time_started: None,
                time_completed: None,
                error: None,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> ActionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn status(&self) -> ActionStatus {
        lock(&self.record).status
    }

    #[must_use]
    pub fn snapshot(&self) -> ActionSnapshot {
        self.snapshot_of(&lock(&self.record))
    }

    /// Request cancellation.
    ///
    /// A pending action is cancelled on the spot and will never run. A
    /// running action only gets its flag raised: the handler may stop at its
    /// next [`checkpoint`](ActionContext::checkpoint), and either way the
    /// action ends `Cancelled` once the handler returns. Returns the status
    /// right after the request.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::AlreadyTerminal`] if the action already finished.
    pub fn cancel(&self) -> Result<ActionStatus, ActionError> {
        let mut record = lock(&self.record);
        match record.status {
            ActionStatus::Pending => {
                self.cancel.cancel();
                record.transition(ActionStatus::Cancelled);
                tracing::info!(action = %self.name, id = %self.id, "pending action cancelled");
                Ok(ActionStatus::Cancelled)
            }
            ActionStatus::Running => {
                self.cancel.cancel();
                tracing::info!(action = %self.name, id = %self.id, "cancellation requested");
                Ok(ActionStatus::Running)
            }
            status => Err(ActionError::AlreadyTerminal {
                id: self.id,
                status,
            }),
        }
    }

    /// Run the handler to completion and record the outcome.
    ///
    /// Publishes an `actionStatus` event when the action starts and when it
    /// finishes. Handler errors, panics and timeouts end in `Failed`; they
    /// are recorded, logged and never returned.
    pub async fn run(&self, publisher: &dyn EventPublisher, timeout: Option<Duration>) {
        if !self.begin() {
            tracing::debug!(action = %self.name, id = %self.id, "skipping cancelled action");
            return;
        }
        publisher.publish(ThingEvent::ActionStatus(self.snapshot()));

        let outcome = self.execute(timeout).await;
        let snapshot = self.finish(outcome);
        publisher.publish(ThingEvent::ActionStatus(snapshot));
    }

    fn begin(&self) -> bool {
        let mut record = lock(&self.record);
        if self.cancel.is_cancelled() {
            return false;
        }
        record.transition(ActionStatus::Running)
    }

    async fn execute(&self, timeout: Option<Duration>) -> Result<(), ActionExecutionError> {
        let context = ActionContext {
            id: self.id,
            name: self.name.clone(),
            input: Arc::clone(&self.input),
            properties: Weak::clone(&self.properties),
            cancel: self.cancel.clone(),
        };

        // A nested task turns a panicking handler into a JoinError.
        let mut task = tokio::spawn((self.handler)(context));
        let joined = match timeout {
            Some(limit) => {
                if let Ok(joined) = tokio::time::timeout(limit, &mut task).await {
                    joined
                } else {
                    task.abort();
                    return Err(ActionExecutionError::TimedOut(limit));
                }
            }
            None => task.await,
        };

        match joined {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(ActionExecutionError::Panicked),
            Err(_) => Err(ActionExecutionError::Aborted),
        }
    }

    fn finish(&self, outcome: Result<(), ActionExecutionError>) -> ActionSnapshot {
        let mut record = lock(&self.record);
        let next = match &outcome {
            Err(ActionExecutionError::TimedOut(_)) => ActionStatus::Failed,
            _ if self.cancel.is_cancelled() => ActionStatus::Cancelled,
            Ok(()) => ActionStatus::Completed,
            Err(_) => ActionStatus::Failed,
        };
        if let (ActionStatus::Failed, Err(err)) = (next, &outcome) {
            record.error = Some(err.to_string());
        }
        record.transition(next);

        let took_ms = record
            .time_started
            .zip(record.time_completed)
            .map_or(0, |(start, end)| elapsed_ms(start, end));
        match (&record.error, next) {
            (Some(error), ActionStatus::Failed) => {
                tracing::warn!(action = %self.name, id = %self.id, %error, took_ms, "action failed");
            }
            _ => {
                tracing::info!(action = %self.name, id = %self.id, status = %next, took_ms, "action finished");
            }
        }

        self.snapshot_of(&record)
    }

    fn snapshot_of(&self, record: &Record) -> ActionSnapshot {
        ActionSnapshot {
            id: self.id,
            name: self.name.clone(),
            input: (*self.input).clone(),
            status: record.status,
            time_requested: record.time_requested,
            time_started: record.time_started,
            time_completed: record.time_completed,
            error: record.error.clone(),
        }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
