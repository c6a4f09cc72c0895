//! Result and error types for Pagewright.

use thiserror::Error;

/// Result type for Pagewright operations
pub type PagewrightResult<T> = Result<T, PagewrightError>;

/// Errors that can occur in Pagewright
#[derive(Debug, Error)]
pub enum PagewrightError {
    /// Runtime configuration rejected at construction or update
    #[error("Invalid configuration for {field}: {message}")]
    ConfigValidationFailed {
        /// Offending field or profile key
        field: String,
        /// Error message
        message: String,
    },

    /// Every selector candidate failed its existence probe
    #[error("No candidate resolved for '{element}'; tried: {}", attempted.join(", "))]
    NoCandidateResolved {
        /// Logical element name
        element: String,
        /// Attempted candidates in order, each with its probe outcome
        attempted: Vec<String>,
    },

    /// Element resolved but never reached an actionable state
    #[error(
        "Element '{target}' not actionable: still not {condition} after {elapsed_ms}ms (observed: {observed})"
    )]
    ElementNotActionable {
        /// Target description
        target: String,
        /// Required condition
        condition: String,
        /// Time spent waiting
        elapsed_ms: u64,
        /// Final observed state
        observed: String,
    },

    /// Wait condition not satisfied in time
    #[error(
        "Timed out after {elapsed_ms}ms (limit {timeout_ms}ms) waiting for {target} to be {condition} (observed: {observed})"
    )]
    WaitTimeoutExpired {
        /// Condition description
        condition: String,
        /// Target description
        target: String,
        /// Effective timeout
        timeout_ms: u64,
        /// Time spent waiting
        elapsed_ms: u64,
        /// Final observed state
        observed: String,
    },

    /// Expectation not met
    #[error("Assertion failed for {target}: expected {expected}, but was {actual}")]
    AssertionFailed {
        /// Target description
        target: String,
        /// Expected state
        expected: String,
        /// Observed state
        actual: String,
    },

    /// Soft assertions collected at least one failure
    #[error("{count} soft assertion(s) failed:\n{}", failures.join("\n"))]
    SoftAssertionsFailed {
        /// Number of failures
        count: usize,
        /// Failure messages, in recording order
        failures: Vec<String>,
    },

    /// The browser driver reported an error
    #[error("Driver operation '{operation}' failed on {target}: {message}")]
    DriverOperationFailed {
        /// Driver operation name
        operation: String,
        /// Target description
        target: String,
        /// Error message
        message: String,
    },

    /// Caller passed an unusable argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PagewrightError {
    /// Create a configuration validation error
    #[must_use]
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Wrap an error reported by the driver
    #[must_use]
    pub fn driver(
        operation: impl Into<String>,
        target: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::DriverOperationFailed {
            operation: operation.into(),
            target: target.to_string(),
            message: error.to_string(),
        }
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::WaitTimeoutExpired { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_candidate_lists_every_attempt() {
        let err = PagewrightError::NoCandidateResolved {
            element: "search".to_string(),
            attempted: vec![
                "test-id(\"search-input\"): 0 matches".to_string(),
                "placeholder(\"Search\"): 0 matches".to_string(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("search-input"));
        assert!(msg.contains("placeholder(\"Search\")"));
    }

    #[test]
    fn test_timeout_message_has_observed_state() {
        let err = PagewrightError::WaitTimeoutExpired {
            condition: "visible".to_string(),
            target: "spinner".to_string(),
            timeout_ms: 2000,
            elapsed_ms: 2001,
            observed: "0 matches".to_string(),
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("observed: 0 matches"));
    }

    #[test]
    fn test_config_helper() {
        let err = PagewrightError::config("TIMEOUT", "must be at least 1000ms");
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("TIMEOUT"));
    }

    #[test]
    fn test_soft_failures_joined() {
        let err = PagewrightError::SoftAssertionsFailed {
            count: 2,
            failures: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "2 soft assertion(s) failed:\na\nb");
    }
}
