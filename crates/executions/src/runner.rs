//! Execution runner - submit an operation on a node instance and collect its result

use crate::client::ControlPlane;
use crate::error::Result;
use crate::poller::StatusPoller;
use crate::types::{ExecutionRequest, PollConfig, RuntimeProperties};
use serde_json::{Map, Value};

/// Workflow that runs a single operation on selected node instances.
pub const WORKFLOW_EXECUTE_OPERATION: &str = "execute_operation";

/// Runs operations against single node instances and waits for their results.
///
/// Submission is never retried. Waiting is delegated to a [`StatusPoller`];
/// a timeout yields an empty result instead of an error.
pub struct ExecutionRunner<C> {
    poller: StatusPoller<C>,
    default_workflow: String,
    force: bool,
}

impl<C: ControlPlane> ExecutionRunner<C> {
    /// Create a runner with default polling configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, PollConfig::default())
    }

    /// Create a runner with explicit polling configuration.
    pub fn with_config(client: C, config: PollConfig) -> Self {
        Self {
            poller: StatusPoller::with_config(client, config),
            default_workflow: WORKFLOW_EXECUTE_OPERATION.to_string(),
            force: true,
        }
    }

    /// Use a different workflow when a call does not name one.
    pub fn with_default_workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.default_workflow = workflow_id.into();
        self
    }

    /// Whether submissions are forced past other running executions.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The poller used by [`wait_for_result`](Self::wait_for_result).
    pub fn poller(&self) -> &StatusPoller<C> {
        &self.poller
    }

    /// Workflow used when a call does not name one.
    pub fn default_workflow(&self) -> &str {
        &self.default_workflow
    }

    /// Submit `operation` on a single node instance.
    ///
    /// `inputs` are passed as the operation's keyword arguments and may
    /// override conflicting built-in parameters. Returns the execution id.
    pub fn start(
        &self,
        deployment_id: &str,
        node_instance_id: &str,
        operation: &str,
        inputs: &Map<String, Value>,
        workflow_id: Option<&str>,
    ) -> Result<String> {
        let workflow_id = workflow_id.unwrap_or(&self.default_workflow);

        log::debug!(
            "Running workflow {} for deployment {} with inputs {}",
            workflow_id,
            deployment_id,
            Value::Object(inputs.clone())
        );

        let request = ExecutionRequest {
            deployment_id: deployment_id.to_string(),
            workflow_id: workflow_id.to_string(),
            parameters: operation_parameters(node_instance_id, operation, inputs),
            allow_custom_parameters: true,
            force: self.force,
        };

        let execution = self.poller.client().start_execution(&request)?;
        log::debug!("Got execution ID: {}", execution.id);

        Ok(execution.id)
    }

    /// Wait for an execution and return the node instance's runtime properties.
    ///
    /// Returns an empty map if the execution is still pending when the
    /// timeout runs out.
    pub fn wait_for_result(
        &self,
        execution_id: &str,
        node_instance_id: &str,
    ) -> Result<RuntimeProperties> {
        if !self.poller.run(execution_id)? {
            return Ok(RuntimeProperties::new());
        }

        log::debug!(
            "Getting runtime_properties for node instance: {}",
            node_instance_id
        );
        let instance = self.poller.client().get_node_instance(node_instance_id)?;

        Ok(instance.runtime_properties)
    }

    /// [`start`](Self::start) followed by [`wait_for_result`](Self::wait_for_result).
    pub fn run_and_wait_for_result(
        &self,
        deployment_id: &str,
        node_instance_id: &str,
        operation: &str,
        inputs: &Map<String, Value>,
        workflow_id: Option<&str>,
    ) -> Result<RuntimeProperties> {
        let execution_id = self.start(
            deployment_id,
            node_instance_id,
            operation,
            inputs,
            workflow_id,
        )?;

        self.wait_for_result(&execution_id, node_instance_id)
    }
}

/// Workflow parameters for running one operation on one node instance
fn operation_parameters(
    node_instance_id: &str,
    operation: &str,
    inputs: &Map<String, Value>,
) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert(
        "node_instance_ids".to_string(),
        Value::Array(vec![Value::String(node_instance_id.to_string())]),
    );
    parameters.insert("operation".to_string(), Value::String(operation.to_string()));
    parameters.insert(
        "operation_kwargs".to_string(),
        Value::Object(inputs.clone()),
    );
    parameters.insert("allow_kwargs_override".to_string(), Value::Bool(true));
    parameters
}
