//! Control plane abstraction.
//!
//! The [`ControlPlane`] trait is the only way this crate talks to the
//! orchestrator, allowing for different implementations (REST, mock for
//! testing).

pub mod rest;

use crate::error::Result;
use crate::types::{Execution, ExecutionRequest, NodeInstance};

/// Remote control plane operations.
pub trait ControlPlane: Send + Sync {
    /// Submit a workflow execution.
    fn start_execution(&self, request: &ExecutionRequest) -> Result<Execution>;

    /// Fetch an execution, including its current status.
    fn get_execution(&self, execution_id: &str) -> Result<Execution>;

    /// Fetch a node instance, including its runtime properties.
    fn get_node_instance(&self, node_instance_id: &str) -> Result<NodeInstance>;
}

impl<T: ControlPlane + ?Sized> ControlPlane for &T {
    fn start_execution(&self, request: &ExecutionRequest) -> Result<Execution> {
        (**self).start_execution(request)
    }

    fn get_execution(&self, execution_id: &str) -> Result<Execution> {
        (**self).get_execution(execution_id)
    }

    fn get_node_instance(&self, node_instance_id: &str) -> Result<NodeInstance> {
        (**self).get_node_instance(node_instance_id)
    }
}

impl<T: ControlPlane + ?Sized> ControlPlane for Box<T> {
    fn start_execution(&self, request: &ExecutionRequest) -> Result<Execution> {
        (**self).start_execution(request)
    }

    fn get_execution(&self, execution_id: &str) -> Result<Execution> {
        (**self).get_execution(execution_id)
    }

    fn get_node_instance(&self, node_instance_id: &str) -> Result<NodeInstance> {
        (**self).get_node_instance(node_instance_id)
    }
}
