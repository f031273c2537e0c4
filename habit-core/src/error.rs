use thiserror::Error;

pub type Result<T> = std::result::Result<T, HabitError>;

#[derive(Debug, Error)]
pub enum HabitError {
    /// A required field is missing or malformed.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("habit {0} not found")]
    NotFound(i64),

    /// A uniqueness conflict reported by storage, e.g. two check-ins for the
    /// same habit and day.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HabitError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Converts a rusqlite failure, lifting constraint violations out of the
    /// generic storage bucket.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg.clone().unwrap_or_else(|| code.to_string());
                Self::ConstraintViolation(detail)
            }
            other => Self::Storage(other),
        }
    }
}
