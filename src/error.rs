use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Could not read properties: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed properties: {0}")]
    Json(#[from] serde_json::Error),
}

// For host surfaces that only carry messages
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}
