//! Execution status polling.
//!
//! [`StatusPoller`] waits for a submitted execution to reach a terminal
//! status. The first query happens immediately; after each pending status it
//! sleeps for the configured interval. The timeout is checked only between
//! queries, so a slow query can overrun it by its own latency.

use crate::client::ControlPlane;
use crate::error::{Error, Result};
use crate::types::{Execution, PollConfig, StatusClass};
use std::thread;
use std::time::Instant;

/// Blocking poller for one execution at a time.
pub struct StatusPoller<C> {
    client: C,
    config: PollConfig,
}

impl<C: ControlPlane> StatusPoller<C> {
    /// Create a poller with default timeout, interval and statuses.
    pub fn new(client: C) -> Self {
        Self::with_config(client, PollConfig::default())
    }

    /// Create a poller with explicit configuration.
    pub fn with_config(client: C, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// The active polling configuration.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// The control plane this poller queries.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Query the execution once and classify its status.
    ///
    /// A recognized failure status is returned as
    /// [`Error::ExecutionFailed`], never as [`StatusClass::Failure`].
    pub fn check_status(&self, execution_id: &str) -> Result<StatusClass> {
        let execution = self
            .client
            .get_execution(execution_id)
            .map_err(|e| Error::status_query(execution_id, e))?;

        match self.classify(&execution)? {
            StatusClass::Success => {
                log::debug!("Execution {} succeeded", execution_id);
                Ok(StatusClass::Success)
            }
            StatusClass::Failure => Err(Error::ExecutionFailed {
                execution_id: execution_id.to_string(),
                status: execution.status().unwrap_or_default().to_string(),
            }),
            StatusClass::Pending => Ok(StatusClass::Pending),
        }
    }

    /// Classify an already fetched execution against the configured status sets.
    ///
    /// A missing or empty status is a protocol error.
    pub fn classify(&self, execution: &Execution) -> Result<StatusClass> {
        let Some(status) = execution.status() else {
            return Err(Error::Protocol(format!(
                "failed to retrieve status for execution: {}",
                execution.id
            )));
        };

        log::debug!(
            "Got status: \"{}\" for execution ID: {}",
            status,
            execution.id
        );
        Ok(self.config.statuses.classify(status))
    }

    /// Wait for the execution to finish.
    ///
    /// Returns `Ok(true)` once a success status is seen and `Ok(false)` if
    /// the timeout runs out while the execution is still pending. A failure
    /// status or a failed query is returned as an error right away.
    pub fn run(&self, execution_id: &str) -> Result<bool> {
        let started = Instant::now();

        loop {
            if self.check_status(execution_id)? == StatusClass::Success {
                return Ok(true);
            }

            if self.config.timeout.is_exhausted(started.elapsed()) {
                break;
            }

            log::debug!(
                "Waiting {:?} for next attempt of execution status checking...",
                self.config.interval
            );
            thread::sleep(self.config.interval);

            if self.config.timeout.is_exhausted(started.elapsed()) {
                break;
            }
        }

        log::error!(
            "Execution {} status checking timed out after {}",
            execution_id,
            self.config.timeout
        );
        Ok(false)
    }
}
