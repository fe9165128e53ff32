use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected before any network or database work.
    #[error("{0}")]
    Input(String),

    #[error("Error fetching URL info: {0}")]
    Fetch(String),

    #[error("Database error: {0}")]
    Storage(String),

    #[error("Invalid due date \"{0}\" (expected YYYY-MM-DD)")]
    InvalidDueDate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Errors that end a single user action and get reported in a notice
    /// rather than tearing down the terminal.
    pub fn is_action_error(&self) -> bool {
        matches!(
            self,
            AppError::Input(_)
                | AppError::Fetch(_)
                | AppError::Storage(_)
                | AppError::InvalidDueDate(_)
        )
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<tokio_rusqlite::Error> for AppError {
    fn from(e: tokio_rusqlite::Error) -> Self {
        match e {
            tokio_rusqlite::Error::Rusqlite(inner) => AppError::Storage(inner.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Fetch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_displays_message_verbatim() {
        let err = AppError::Input("URL cannot be empty.".to_string());
        assert_eq!(err.to_string(), "URL cannot be empty.");
        assert!(err.is_action_error());
    }

    #[test]
    fn storage_and_fetch_errors_carry_the_cause() {
        let err = AppError::Storage("database is locked".to_string());
        assert_eq!(err.to_string(), "Database error: database is locked");

        let err = AppError::Fetch("connection refused".to_string());
        assert_eq!(err.to_string(), "Error fetching URL info: connection refused");
    }

    #[test]
    fn io_errors_are_not_action_errors() {
        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "tty gone"));
        assert!(!err.is_action_error());
    }
}
