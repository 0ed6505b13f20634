//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use nlpthing_domain::error::{ActionError, PropertyError, ThingError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ThingError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(ThingError);

impl From<ThingError> for ApiError {
    fn from(err: ThingError) -> Self {
        Self(err)
    }
}

impl From<PropertyError> for ApiError {
    fn from(err: PropertyError) -> Self {
        Self(err.into())
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ThingError::Validation(_) | ThingError::Property(PropertyError::InvalidValue(_)) => {
                StatusCode::BAD_REQUEST
            }
            ThingError::Property(PropertyError::ReadOnly(_)) => StatusCode::FORBIDDEN,
            ThingError::Property(PropertyError::Unknown(_))
            | ThingError::Action(ActionError::NotFound(_)) => StatusCode::NOT_FOUND,
            ThingError::Action(ActionError::AlreadyTerminal { .. }) => StatusCode::CONFLICT,
            ThingError::Definition(_) | ThingError::NoRuntime => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal thing error");
            "internal server error".to_string()
        } else {
            match &self.0 {
                ThingError::Validation(err) => err.to_string(),
                ThingError::Property(err) => err.to_string(),
                ThingError::Action(err) => err.to_string(),
                other => other.to_string(),
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlpthing_domain::action::ActionStatus;
    use nlpthing_domain::error::{DefinitionError, NotFoundError};
    use nlpthing_domain::id::ActionId;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn should_map_errors_to_status_codes() {
        assert_eq!(
            status_of(ValidationError::MissingField("text".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PropertyError::InvalidValue("words".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PropertyError::ReadOnly("words".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(PropertyError::Unknown("color".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ActionError::NotFound(NotFoundError {
                entity: "Action",
                id: "translate".to_string(),
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ActionError::AlreadyTerminal {
                id: ActionId::new(),
                status: ActionStatus::Completed,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ThingError::Definition(DefinitionError::DuplicateAction(
                "x".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
