//! # executions
//!
//! Submit operations to a deployment control plane and wait for them.
//!
//! This crate provides:
//! - A [`ControlPlane`](client::ControlPlane) abstraction with a blocking REST client
//! - A [`StatusPoller`] that waits for an execution to reach a terminal status
//! - An [`ExecutionRunner`] that submits an operation on one node instance
//!   and returns that instance's runtime properties once it finishes
//!
//! ## Example
//!
//! ```no_run
//! use executions::client::rest::RestClient;
//! use executions::{ExecutionRunner, PollConfig, Timeout};
//! use std::time::Duration;
//!
//! let client = RestClient::new("https://manager.example.com")
//!     .with_credentials("admin", "secret")
//!     .with_tenant("default_tenant");
//! let config = PollConfig::default()
//!     .with_timeout(Timeout::Unbounded)
//!     .with_interval(Duration::from_secs(2));
//!
//! let runner = ExecutionRunner::with_config(client, config);
//! let properties = runner
//!     .run_and_wait_for_result("web", "vm_x1y2z3", "usage.collect", &Default::default(), None)
//!     .unwrap();
//! println!("{:?}", properties.get("usage"));
//! ```
//!
//! ## Outcomes
//!
//! Waiting has three outcomes. Success returns the runtime properties. A
//! timeout returns an empty map and is logged at error level. A failure
//! status, or any failed request, is returned as an [`Error`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod poller;
pub mod runner;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use poller::StatusPoller;
pub use runner::{ExecutionRunner, WORKFLOW_EXECUTE_OPERATION};
pub use types::{
    Execution, ExecutionRequest, NodeInstance, PollConfig, RuntimeProperties, StatusClass,
    StatusSets, Timeout,
};
