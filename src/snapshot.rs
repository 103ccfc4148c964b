//! Deployment snapshots
//!
//! A snapshot is a JSON export of a deployment's node instances. Instances
//! may nest through `children` (e.g. a VM contained in a network); the walk
//! is depth first, parents before children, siblings in file order.

use anyhow::{Context, Result};
use collector::InstanceCursor;
use executions::RuntimeProperties;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Scope of a collection run over a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub id: String,
}

/// One position in the walk
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub id: String,
    pub node_id: String,
    pub type_hierarchy: Vec<String>,
    pub runtime_properties: RuntimeProperties,
    /// Id of the containing instance, if nested
    pub parent: Option<String>,
    pub depth: usize,
}

impl Instance {
    /// Whether this instance's node is, or derives from, `node_type`
    pub fn is_a(&self, node_type: &str) -> bool {
        self.type_hierarchy.iter().any(|t| t == node_type)
    }
}

/// Traversal context over a snapshot
pub type DeploymentContext = InstanceCursor<Deployment, Instance>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub deployment_id: String,
    #[serde(default)]
    pub node_instances: Vec<SnapshotInstance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInstance {
    pub id: String,
    pub node_id: String,
    #[serde(default)]
    pub type_hierarchy: Vec<String>,
    #[serde(default)]
    pub runtime_properties: RuntimeProperties,
    #[serde(default)]
    pub children: Vec<SnapshotInstance>,
}

impl Snapshot {
    /// Read a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid snapshot format: {}", path.display()))
    }

    /// Flatten into a traversal context
    pub fn into_context(self) -> DeploymentContext {
        let mut instances = Vec::new();
        for root in self.node_instances {
            flatten(root, None, 0, &mut instances);
        }
        log::debug!(
            "Deployment {} has {} node instances",
            self.deployment_id,
            instances.len()
        );
        InstanceCursor::new(
            Deployment {
                id: self.deployment_id,
            },
            instances,
        )
    }
}

fn flatten(node: SnapshotInstance, parent: Option<&str>, depth: usize, out: &mut Vec<Instance>) {
    let id = node.id.clone();
    out.push(Instance {
        id: node.id,
        node_id: node.node_id,
        type_hierarchy: node.type_hierarchy,
        runtime_properties: node.runtime_properties,
        parent: parent.map(str::to_string),
        depth,
    });
    for child in node.children {
        flatten(child, Some(&id), depth + 1, out);
    }
}
