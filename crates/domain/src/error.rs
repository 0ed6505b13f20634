//! Error types used across the workspace.
//!
//! Each concern has its own typed error. [`ThingError`] is the umbrella
//! type the transport maps into responses; narrower errors convert into it
//! via `#[from]`.

use std::time::Duration;

use crate::action::ActionStatus;
use crate::id::ActionId;
use crate::value::ValueType;

/// A write rejected by a value's validator. The previous value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value rejected by validator")]
pub struct InvalidValue;

/// Input or metadata that does not satisfy its declared shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("thing id must not be empty")]
    EmptyThingId,

    #[error("input must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` must be of type {expected}")]
    WrongType { field: String, expected: ValueType },

    #[error("field `{0}` is out of range")]
    OutOfRange(String),

    #[error("minimum must not exceed maximum")]
    InvalidRange,

    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}

/// A lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of thing that was looked up (`"Action"`, `"ActionRequest"`, …).
    pub entity: &'static str,
    pub id: String,
}

/// Errors raised by property reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property `{0}`")]
    Unknown(String),

    #[error("invalid value for property `{0}`")]
    InvalidValue(String),

    #[error("property `{0}` is read-only")]
    ReadOnly(String),
}

/// Errors raised when invoking, querying or cancelling actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("action {id} is already {status}")]
    AlreadyTerminal { id: ActionId, status: ActionStatus },
}

/// Configuration bugs detected while assembling a thing. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("property `{0}` is already defined")]
    DuplicateProperty(String),

    #[error("action `{0}` is already registered")]
    DuplicateAction(String),

    #[error("initial value of property `{0}` violates its constraints")]
    InvalidInitialValue(String),

    #[error("action `{0}` has no handler")]
    MissingHandler(String),

    #[error("invalid definition")]
    Validation(#[from] ValidationError),
}

/// Failure of a text-analysis computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("text is empty")]
    EmptyText,

    #[error("analysis failed: {0}")]
    Failed(String),
}

/// Failure raised while an action's computation runs.
///
/// Recorded on the action as its error summary; never propagated past the
/// executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionExecutionError {
    #[error("action was cancelled")]
    Cancelled,

    #[error("thing is no longer available")]
    ThingGone,

    #[error("missing or invalid input field `{0}`")]
    Input(String),

    #[error("{0}")]
    Property(#[from] PropertyError),

    #[error("{0}")]
    Analysis(#[from] AnalysisError),

    #[error("computation panicked")]
    Panicked,

    #[error("computation was aborted")]
    Aborted,

    #[error("action timed out after {0:?}")]
    TimedOut(Duration),
}

/// Umbrella error for every recoverable and fatal thing-level failure.
#[derive(Debug, thiserror::Error)]
pub enum ThingError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("property error")]
    Property(#[from] PropertyError),

    #[error("action error")]
    Action(#[from] ActionError),

    #[error("definition error")]
    Definition(#[from] DefinitionError),

    #[error("no tokio runtime available to execute actions")]
    NoRuntime,
}
