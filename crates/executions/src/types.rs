//! Core types for submitting and observing executions.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Runtime properties of a node instance, as stored by the control plane.
pub type RuntimeProperties = Map<String, Value>;

/// An execution as observed from the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Opaque execution identifier
    pub id: String,
    /// Current status string, absent if the server did not report one
    #[serde(default)]
    pub status: Option<String>,
    /// Workflow the execution runs
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// Deployment the execution belongs to
    #[serde(default)]
    pub deployment_id: Option<String>,
    /// Error text reported by the control plane, if any
    #[serde(default)]
    pub error: Option<String>,
}

impl Execution {
    /// The reported status, treating an empty string as missing.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }
}

/// A node instance as returned by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInstance {
    /// Node instance identifier
    pub id: String,
    /// Node this instance was created from
    #[serde(default)]
    pub node_id: Option<String>,
    /// Lifecycle state of the instance
    #[serde(default)]
    pub state: Option<String>,
    /// Result state written by operations
    #[serde(default)]
    pub runtime_properties: RuntimeProperties,
}

/// Request to start a workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRequest {
    /// Target deployment
    pub deployment_id: String,
    /// Workflow to run
    pub workflow_id: String,
    /// Workflow parameters
    pub parameters: Map<String, Value>,
    /// Accept parameters the workflow does not declare
    pub allow_custom_parameters: bool,
    /// Start even if other executions are running on the deployment
    pub force: bool,
}

/// Classification of an execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Terminal success
    Success,
    /// Terminal failure
    Failure,
    /// Anything not recognized as terminal
    Pending,
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// Status strings recognized as terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSets {
    /// Statuses meaning the execution succeeded
    pub success: Vec<String>,
    /// Statuses meaning the execution failed
    pub failure: Vec<String>,
}

impl StatusSets {
    /// Default success statuses.
    pub const DEFAULT_SUCCESS: [&'static str; 2] = ["terminated", "cancelled"];
    /// Default failure statuses.
    pub const DEFAULT_FAILURE: [&'static str; 1] = ["failed"];

    /// Create status sets from explicit lists.
    pub fn new<S, F>(success: S, failure: F) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            success: success.into_iter().map(Into::into).collect(),
            failure: failure.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify a status string. Success wins if a status is in both sets.
    pub fn classify(&self, status: &str) -> StatusClass {
        if self.success.iter().any(|s| s == status) {
            StatusClass::Success
        } else if self.failure.iter().any(|s| s == status) {
            StatusClass::Failure
        } else {
            StatusClass::Pending
        }
    }
}

impl Default for StatusSets {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SUCCESS, Self::DEFAULT_FAILURE)
    }
}

/// How long to keep polling before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Timeout {
    /// Give up once this much time has elapsed
    Bounded(Duration),
    /// Poll until a terminal status is seen
    Unbounded,
}

impl Timeout {
    /// Seconds value that means "no timeout".
    pub const UNBOUNDED_SENTINEL: i64 = -1;

    /// Build a timeout from whole seconds, with `-1` meaning unbounded.
    pub fn from_secs(secs: i64) -> Result<Self> {
        match secs {
            Self::UNBOUNDED_SENTINEL => Ok(Self::Unbounded),
            s if s >= 0 => Ok(Self::Bounded(Duration::from_secs(s as u64))),
            s => Err(Error::Config(format!(
                "timeout must be >= 0 or {} for no timeout, got {}",
                Self::UNBOUNDED_SENTINEL,
                s
            ))),
        }
    }

    /// Whether `elapsed` has used up this budget.
    pub fn is_exhausted(&self, elapsed: Duration) -> bool {
        match self {
            Self::Bounded(limit) => elapsed >= *limit,
            Self::Unbounded => false,
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::Bounded(Duration::from_secs(PollConfig::DEFAULT_TIMEOUT_SECS))
    }
}

impl TryFrom<i64> for Timeout {
    type Error = Error;

    fn try_from(secs: i64) -> Result<Self> {
        Self::from_secs(secs)
    }
}

/// Partial seconds round up and oversized budgets clamp to `i64::MAX`, so a
/// bounded timeout never serializes to zero or to the unbounded sentinel.
impl From<Timeout> for i64 {
    fn from(timeout: Timeout) -> Self {
        match timeout {
            Timeout::Bounded(d) => {
                let secs = d.as_secs().saturating_add(u64::from(d.subsec_nanos() > 0));
                i64::try_from(secs).unwrap_or(i64::MAX)
            }
            Timeout::Unbounded => Timeout::UNBOUNDED_SENTINEL,
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(d) => write!(f, "{}s", d.as_secs_f64()),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Polling configuration for waiting on an execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Overall budget for waiting
    pub timeout: Timeout,
    /// Pause between status queries
    pub interval: Duration,
    /// Terminal status strings
    pub statuses: StatusSets,
}

impl PollConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 180;
    /// Default poll interval in seconds.
    pub const DEFAULT_INTERVAL_SECS: u64 = 5;

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the recognized status sets.
    pub fn with_statuses(mut self, statuses: StatusSets) -> Self {
        self.statuses = statuses;
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Timeout::default(),
            interval: Duration::from_secs(Self::DEFAULT_INTERVAL_SECS),
            statuses: StatusSets::default(),
        }
    }
}
