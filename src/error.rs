use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from reading input or config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Malformed arguments to the tree builder or path helpers.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No extractor produced anything usable from the change list.
    #[error("Extraction failed: {0}")]
    Extract(String),

    /// Malformed JSON change records.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
