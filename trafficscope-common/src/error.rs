use thiserror::Error;

/// Common error type for TrafficScope components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Snapshot endpoint {url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error is a transient fetch failure (the poll cycle should
    /// simply carry on with the last good snapshot).
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status { .. } | Error::Json(_))
    }
}

/// Result type alias using TrafficScope's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = Error::Status {
            status: 500,
            url: "http://localhost/snapshot".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Snapshot endpoint http://localhost/snapshot returned HTTP 500"
        );
        assert!(err.is_transient());
    }

    #[test]
    fn test_config_error_not_transient() {
        assert!(!Error::Config("bad".to_string()).is_transient());
    }
}
