use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use habit_core::HabitError;
use serde_json::json;
use thiserror::Error;

/// Error returned by every handler; renders as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Habit(#[from] HabitError),

    /// The `{id}` path segment is not a habit id at all.
    #[error("invalid habit id: {0}")]
    UnknownId(String),
}

/// Payload fields a JSON data error can be attributed to.
const PAYLOAD_FIELDS: [&str; 6] = ["name", "frequency", "category", "start_date", "date", "text"];

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let field = rejected_field(&rejection);
        Self::Habit(HabitError::validation(field, rejection.body_text()))
    }
}

/// Data errors read "...target type: <path>: <reason>"; the path names the
/// offending field when the value had the wrong type.
fn rejected_field(rejection: &JsonRejection) -> &'static str {
    if !matches!(rejection, JsonRejection::JsonDataError(_)) {
        return "body";
    }
    let text = rejection.body_text();
    text.split_once("target type: ")
        .and_then(|(_, rest)| rest.split_once(": "))
        .and_then(|(path, _)| PAYLOAD_FIELDS.iter().find(|field| **field == path.trim()))
        .copied()
        .unwrap_or("body")
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Habit(HabitError::validation("query", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::UnknownId(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Habit(HabitError::Validation { field, message }) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "field": field }),
            ),
            Self::Habit(err @ HabitError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
            }
            Self::UnknownId(detail) => {
                tracing::debug!(%detail, "Rejected habit id");
                (StatusCode::NOT_FOUND, json!({ "error": "habit not found" }))
            }
            Self::Habit(err @ HabitError::ConstraintViolation(_)) => {
                tracing::warn!(error = %err, "Constraint violation reached the client");
                (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
            }
            Self::Habit(err) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use habit_core::{HabitInput, NoteInput};

    use super::*;

    fn field_of(err: ApiError) -> &'static str {
        match err {
            ApiError::Habit(HabitError::Validation { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn wrongly_typed_field_is_named() {
        let rejection = Json::<NoteInput>::from_bytes(br#"{"text": 5}"#).unwrap_err();
        assert_eq!(field_of(rejection.into()), "text");

        let rejection =
            Json::<HabitInput>::from_bytes(br#"{"name": "Run", "start_date": []}"#).unwrap_err();
        assert_eq!(field_of(rejection.into()), "start_date");
    }

    #[test]
    fn malformed_json_blames_the_body() {
        let rejection = Json::<NoteInput>::from_bytes(b"{not json").unwrap_err();
        assert_eq!(field_of(rejection.into()), "body");
    }
}
