//! Rule-driven handlers for `resmgr collect`
//!
//! A rules file is an ordered list of `[[rule]]` tables. Each rule claims
//! instances of one node type and records selected runtime properties as a
//! fact. Rule order is priority order: an instance is handled by the first
//! rule that matches it and no other.
//!
//! ```toml
//! [[rule]]
//! name = "compute"
//! node_type = "cloudify.nodes.Compute"
//! properties = ["cpu", "ram"]
//! key = "{deployment}.{instance}.usage"
//!
//! [[rule]]
//! name = "other"
//! node_type = "*"
//! ```

use anyhow::{Context, Result};
use collector::{Handler, HandlerChain, TraversalContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::snapshot::{DeploymentContext, Instance};

/// Node type that matches every instance
pub const ANY_TYPE: &str = "*";

const DEFAULT_KEY: &str = "{rule}.{instance}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub node_type: String,
    /// Runtime properties to record; empty means all of them
    #[serde(default)]
    pub properties: Vec<String>,
    /// Fact key template
    #[serde(default)]
    pub key: Option<String>,
}

impl Rule {
    /// Fill the key template in one left-to-right pass; substituted ids are
    /// never rescanned. Unknown placeholders are kept as written.
    fn fact_key(&self, deployment: &str, instance: &Instance) -> String {
        let mut template = self.key.as_deref().unwrap_or(DEFAULT_KEY);
        let mut key = String::with_capacity(template.len());

        while let Some(open) = template.find('{') {
            key.push_str(&template[..open]);
            let rest = &template[open..];
            let Some(close) = rest.find('}') else {
                template = rest;
                break;
            };
            let value = match &rest[1..close] {
                "deployment" => deployment,
                "node" => instance.node_id.as_str(),
                "instance" => instance.id.as_str(),
                "rule" => self.name.as_str(),
                _ => &rest[..=close],
            };
            key.push_str(value);
            template = &rest[close + 1..];
        }
        key.push_str(template);
        key
    }

    fn fact_value(&self, instance: &Instance) -> Value {
        let props = &instance.runtime_properties;
        match self.properties.as_slice() {
            [] => Value::Object(props.clone()),
            [single] => props.get(single).cloned().unwrap_or(Value::Null),
            many => Value::Object(
                many.iter()
                    .filter_map(|name| props.get(name).map(|v| (name.clone(), v.clone())))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl Handler<DeploymentContext> for Rule {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, ctx: &DeploymentContext) -> bool {
        ctx.current()
            .is_some_and(|instance| self.node_type == ANY_TYPE || instance.is_a(&self.node_type))
    }

    fn handle(&self, ctx: &mut DeploymentContext) -> Result<()> {
        let instance = ctx
            .current()
            .context("Rule invoked without a current instance")?;
        let key = self.fact_key(&ctx.scope().id, instance);
        let value = self.fact_value(instance);

        log::debug!("Rule '{}' recorded {}", self.name, key);
        ctx.collected_data_mut().insert(key, value);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Read a rules file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read rules {}", path.display()))?;
        let rules: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid rules file: {}", path.display()))?;
        log::debug!("Loaded {} rules from {}", rules.rules.len(), path.display());
        Ok(rules)
    }

    /// Rules used when no file is given: every instance, all properties
    pub fn catch_all() -> Self {
        Self {
            rules: vec![Rule {
                name: "instance".to_string(),
                node_type: ANY_TYPE.to_string(),
                properties: Vec::new(),
                key: Some("{instance}".to_string()),
            }],
        }
    }

    /// Build the handler chain, preserving file order
    pub fn into_chain(self) -> HandlerChain<DeploymentContext> {
        self.rules
            .into_iter()
            .fold(HandlerChain::new(), |chain, rule| chain.with(rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use collector::Engine;
    use serde_json::json;

    fn context() -> DeploymentContext {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "deployment_id": "web",
            "node_instances": [
                {
                    "id": "vm_1",
                    "node_id": "vm",
                    "type_hierarchy": ["cloudify.nodes.Root", "cloudify.nodes.Compute"],
                    "runtime_properties": {"cpu": 2, "ram": 4096, "ip": "10.0.0.1"}
                },
                {
                    "id": "db_1",
                    "node_id": "db",
                    "type_hierarchy": ["cloudify.nodes.Root", "cloudify.nodes.Database"],
                    "runtime_properties": {"size": 20}
                },
                {
                    "id": "fip_1",
                    "node_id": "fip",
                    "type_hierarchy": ["cloudify.nodes.Root"]
                }
            ]
        }))
        .unwrap();
        snapshot.into_context()
    }

    fn rules(text: &str) -> RuleSet {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_rules_dispatch_first_match() {
        let rule_set = rules(
            r#"
            [[rule]]
            name = "compute"
            node_type = "cloudify.nodes.Compute"
            properties = ["cpu", "ram"]
            key = "{deployment}.{instance}.usage"

            [[rule]]
            name = "db"
            node_type = "cloudify.nodes.Database"
            properties = ["size"]

            [[rule]]
            name = "shadowed"
            node_type = "cloudify.nodes.Compute"
            "#,
        );
        let mut ctx = context();

        let summary = Engine::new(rule_set.into_chain()).run(&mut ctx).unwrap();

        let data = ctx.collected_data();
        assert_eq!(
            data.get("web.vm_1.usage").unwrap(),
            &json!({"cpu": 2, "ram": 4096})
        );
        assert_eq!(data.get("db.db_1").unwrap(), &json!(20));
        assert_eq!(data.len(), 2);
        assert_eq!(summary.unmatched, 1);
    }

    #[test]
    fn test_catch_all_records_everything() {
        let mut ctx = context();

        Engine::new(RuleSet::catch_all().into_chain())
            .run(&mut ctx)
            .unwrap();

        let data = ctx.collected_data();
        assert_eq!(data.len(), 3);
        assert_eq!(data.get("fip_1").unwrap(), &json!({}));
        assert_eq!(data.get("db_1").unwrap(), &json!({"size": 20}));
    }

    #[test]
    fn test_missing_single_property_is_null() {
        let rule = Rule {
            name: "ip".to_string(),
            node_type: ANY_TYPE.to_string(),
            properties: vec!["ip".to_string()],
            key: Some("{node}/{instance}".to_string()),
        };
        let mut ctx = context();

        Engine::new(HandlerChain::new().with(rule))
            .run(&mut ctx)
            .unwrap();

        let data = ctx.collected_data();
        assert_eq!(data.get("vm/vm_1").unwrap(), &json!("10.0.0.1"));
        assert_eq!(data.get("db/db_1").unwrap(), &Value::Null);
    }

    #[test]
    fn test_key_placeholders_in_ids_are_not_expanded() {
        let rule = Rule {
            name: "r".to_string(),
            node_type: ANY_TYPE.to_string(),
            properties: Vec::new(),
            key: Some("{deployment}:{instance}:{rule}:{other}".to_string()),
        };
        let instance = Instance {
            id: "vm_{rule}".to_string(),
            node_id: "{instance}".to_string(),
            type_hierarchy: vec!["compute".to_string()],
            runtime_properties: Default::default(),
            parent: None,
            depth: 0,
        };

        assert_eq!(rule.fact_key("web", &instance), "web:vm_{rule}:r:{other}");

        let unclosed = Rule {
            key: Some("{node}-{inst".to_string()),
            ..rule
        };
        assert_eq!(unclosed.fact_key("web", &instance), "{instance}-{inst");
    }

    #[test]
    fn test_empty_rules_file() {
        let rule_set = rules("");
        assert!(rule_set.rules.is_empty());
        assert!(rule_set.into_chain().is_empty());
    }
}
