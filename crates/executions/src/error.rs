//! Error types for execution operations.
//!
//! Every error here is fatal to the operation that raised it; this crate
//! never retries a submission or a failed status query. Categories exist so
//! callers can tell transport problems apart from executions that ran and
//! failed.

use thiserror::Error;

/// Categories of execution errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The control plane could not be reached or rejected the request
    Transport,
    /// A response arrived but lacked a required field or could not be decoded
    Protocol,
    /// The remote execution finished with a failure status
    RemoteFailure,
    /// Invalid configuration
    Config,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transport => "Control plane request failed",
            Self::Protocol => "Unexpected control plane response",
            Self::RemoteFailure => "Execution failed",
            Self::Config => "Invalid configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Transport => "Check the manager URL, credentials and tenant",
            Self::Protocol => "Check that the manager API version is supported",
            Self::RemoteFailure => "Check the execution logs on the manager for details",
            Self::Config => "Fix the polling or manager settings in the config file",
        }
    }
}

/// Errors that can occur while submitting or observing executions.
#[derive(Debug, Error)]
pub enum Error {
    /// The request itself failed (network, auth, HTTP status)
    #[error("control plane request failed: {message}")]
    Transport {
        /// Details from the failed request
        message: String,
        /// HTTP status code, when the server answered
        status: Option<u16>,
    },

    /// A response was received but is unusable
    #[error("invalid control plane response: {0}")]
    Protocol(String),

    /// Querying an execution's status failed
    #[error("error during polling execution {execution_id} state. Details: {source}")]
    StatusQuery {
        /// Execution that was being polled
        execution_id: String,
        /// The underlying query failure
        #[source]
        source: Box<Error>,
    },

    /// The execution reached a recognized failure status
    #[error("execution {execution_id} failed with status '{status}'. Please check logs to get details")]
    ExecutionFailed {
        /// Execution that failed
        execution_id: String,
        /// The failure status that was observed
        status: String,
    },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::StatusQuery { source, .. } => source.category(),
            Self::ExecutionFailed { .. } => ErrorCategory::RemoteFailure,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether the remote execution itself reported failure.
    pub fn is_remote_failure(&self) -> bool {
        self.category() == ErrorCategory::RemoteFailure
    }

    /// Wrap a status query failure with the execution it concerned.
    pub(crate) fn status_query(execution_id: &str, source: Error) -> Self {
        Self::StatusQuery {
            execution_id: execution_id.to_string(),
            source: Box::new(source),
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Transport {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::Transport {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

/// Result type alias for execution operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let transport = Error::Transport {
            message: "connection refused".to_string(),
            status: None,
        };
        assert_eq!(transport.category(), ErrorCategory::Transport);

        let failed = Error::ExecutionFailed {
            execution_id: "exec-1".to_string(),
            status: "failed".to_string(),
        };
        assert_eq!(failed.category(), ErrorCategory::RemoteFailure);
        assert!(failed.is_remote_failure());

        assert_eq!(
            Error::Protocol("no status".to_string()).category(),
            ErrorCategory::Protocol
        );
    }

    #[test]
    fn test_status_query_inherits_category() {
        let err = Error::status_query(
            "exec-1",
            Error::Transport {
                message: "HTTP 503".to_string(),
                status: Some(503),
            },
        );
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.to_string().contains("exec-1"));
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_status_code_conversion() {
        let err: Error = ureq::Error::StatusCode(401).into();
        match err {
            Error::Transport { status, .. } => assert_eq!(status, Some(401)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_category_text() {
        assert!(!ErrorCategory::Transport.description().is_empty());
        assert!(ErrorCategory::RemoteFailure.advice().contains("logs"));
    }
}
