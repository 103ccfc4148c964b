//! Execution commands: `exec`, `wait` and `status`

use anyhow::{Context as AnyhowContext, Result, bail};
use executions::client::ControlPlane;
use executions::{ExecutionRunner, PollConfig, RuntimeProperties, StatusPoller, Timeout};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::Context;
use crate::cli::{ExecArgs, PollArgs, WaitArgs};
use crate::ui;

pub fn exec(ctx: &Context, args: ExecArgs) -> Result<()> {
    let inputs = parse_inputs(args.inputs.as_deref())?;
    let runner = runner(ctx, &args.poll)?.with_force(ctx.config.execution.force && !args.no_force);

    let execution_id = runner
        .start(
            &args.deployment,
            &args.node_instance,
            &args.operation,
            &inputs,
            args.workflow.as_deref(),
        )
        .with_context(|| {
            format!(
                "Failed to start {} on {} in deployment {}",
                args.operation, args.node_instance, args.deployment
            )
        })?;

    if args.no_wait {
        println!("{}", execution_id);
        return Ok(());
    }

    if !ctx.quiet {
        ui::info(&format!("Started execution {}", execution_id));
    }
    let properties = runner.wait_for_result(&execution_id, &args.node_instance)?;
    report(ctx, &execution_id, &args.node_instance, &properties, args.json)
}

pub fn wait(ctx: &Context, args: WaitArgs) -> Result<()> {
    let runner = runner(ctx, &args.poll)?;
    let properties = runner.wait_for_result(&args.execution_id, &args.node_instance)?;
    report(ctx, &args.execution_id, &args.node_instance, &properties, args.json)
}

pub fn status(ctx: &Context, execution_id: &str) -> Result<()> {
    let poller = StatusPoller::with_config(
        ctx.config.rest_client(),
        ctx.config.polling.to_poll_config(),
    );
    describe(&poller, execution_id)
}

/// Fetch one execution and print it with its status classification
fn describe<C: ControlPlane>(poller: &StatusPoller<C>, execution_id: &str) -> Result<()> {
    let execution = poller.client().get_execution(execution_id)?;
    let class = poller.classify(&execution)?;

    ui::header(&format!("Execution {}", execution.id));
    if let Some(workflow) = &execution.workflow_id {
        ui::kv("workflow", workflow);
    }
    if let Some(deployment) = &execution.deployment_id {
        ui::kv("deployment", deployment);
    }
    ui::kv("status", execution.status().unwrap_or_default());
    ui::kv("class", &class.to_string());
    if let Some(error) = execution.error.as_deref().filter(|e| !e.is_empty()) {
        ui::kv("error", error);
    }
    Ok(())
}

fn runner(ctx: &Context, poll: &PollArgs) -> Result<ExecutionRunner<impl ControlPlane>> {
    let config = poll_config(ctx, poll)?;
    log::debug!(
        "Polling with timeout {} and interval {:?}",
        config.timeout,
        config.interval
    );

    Ok(ExecutionRunner::with_config(ctx.config.rest_client(), config)
        .with_default_workflow(ctx.config.execution.workflow.clone())
        .with_force(ctx.config.execution.force))
}

/// Config-file polling settings with command-line overrides applied
fn poll_config(ctx: &Context, poll: &PollArgs) -> Result<PollConfig> {
    let mut config = ctx.config.polling.to_poll_config();
    if let Some(secs) = poll.timeout {
        config = config.with_timeout(Timeout::from_secs(secs)?);
    }
    if let Some(secs) = poll.interval {
        config = config.with_interval(Duration::from_secs(secs));
    }
    Ok(config)
}

fn parse_inputs(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(raw).context("Operation inputs must be valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("Operation inputs must be a JSON object, got {}", other),
    }
}

fn report(
    ctx: &Context,
    execution_id: &str,
    node_instance: &str,
    properties: &RuntimeProperties,
    json: bool,
) -> Result<()> {
    if properties.is_empty() {
        // Timeout and "finished without properties" both land here
        let message = format!(
            "No result for {} from execution {} (timed out or nothing recorded)",
            node_instance, execution_id
        );
        if !json {
            ui::warn(&message);
            return Ok(());
        }
        ui::warn_stderr(&message);
    }

    if json {
        println!("{}", render_json(properties)?);
        return Ok(());
    }

    if !ctx.quiet {
        ui::success(&format!("Execution {} finished", execution_id));
    }
    ui::header(&format!("Runtime properties: {}", node_instance));
    for (key, value) in properties {
        ui::kv(key, &value.to_string());
    }
    Ok(())
}

fn render_json(properties: &RuntimeProperties) -> Result<String> {
    Ok(serde_json::to_string_pretty(properties)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;

    fn context() -> Context {
        Context {
            verbose: 0,
            quiet: true,
            config: Config::default(),
        }
    }

    #[test]
    fn test_parse_inputs() {
        assert!(parse_inputs(None).unwrap().is_empty());

        let inputs = parse_inputs(Some(r#"{"size": 3, "zone": "a"}"#)).unwrap();
        assert_eq!(inputs["size"], 3);
        assert_eq!(inputs["zone"], "a");

        assert!(parse_inputs(Some("[1, 2]")).is_err());
        assert!(parse_inputs(Some("{not json")).is_err());
    }

    #[test]
    fn test_poll_overrides() {
        let ctx = context();
        let args = PollArgs {
            timeout: Some(-1),
            interval: Some(1),
        };

        let config = poll_config(&ctx, &args).unwrap();

        assert_eq!(config.timeout, Timeout::Unbounded);
        assert_eq!(config.interval, Duration::from_secs(1));
    }

    #[test]
    fn test_poll_defaults_from_config() {
        let ctx = context();
        let args = PollArgs {
            timeout: None,
            interval: None,
        };

        assert_eq!(poll_config(&ctx, &args).unwrap(), PollConfig::default());
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let ctx = context();
        let args = PollArgs {
            timeout: Some(-7),
            interval: None,
        };

        assert!(poll_config(&ctx, &args).is_err());
    }

    /// Serves one canned execution document
    struct Fixed(Value);

    impl ControlPlane for Fixed {
        fn start_execution(
            &self,
            _request: &executions::ExecutionRequest,
        ) -> executions::Result<executions::Execution> {
            Err(executions::Error::Protocol("read-only".to_string()))
        }

        fn get_execution(&self, _execution_id: &str) -> executions::Result<executions::Execution> {
            Ok(serde_json::from_value(self.0.clone())?)
        }

        fn get_node_instance(&self, _id: &str) -> executions::Result<executions::NodeInstance> {
            Err(executions::Error::Protocol("read-only".to_string()))
        }
    }

    #[test]
    fn test_status_without_status_field_fails() {
        let poller = StatusPoller::new(Fixed(json!({"id": "exec-1", "workflow_id": "install"})));

        let err = describe(&poller, "exec-1").unwrap_err();

        let exec_err = err.downcast_ref::<executions::Error>().unwrap();
        assert_eq!(exec_err.category(), executions::ErrorCategory::Protocol);
    }

    #[test]
    fn test_status_reports_failed_execution() {
        let poller = StatusPoller::new(Fixed(json!({"id": "exec-1", "status": "failed"})));

        assert!(describe(&poller, "exec-1").is_ok());
    }

    #[test]
    fn test_empty_result_renders_as_empty_object() {
        assert_eq!(render_json(&RuntimeProperties::new()).unwrap(), "{}");
        assert!(report(&context(), "exec-1", "vm_1", &RuntimeProperties::new(), true).is_ok());
    }

    #[test]
    fn test_runner_uses_configured_workflow() {
        let mut ctx = context();
        ctx.config.execution.workflow = "scale".to_string();
        let args = PollArgs {
            timeout: None,
            interval: None,
        };

        let runner = runner(&ctx, &args).unwrap();

        assert_eq!(runner.default_workflow(), "scale");
    }
}
