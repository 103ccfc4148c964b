//! `resmgr collect` - walk a deployment snapshot through the rule chain

use anyhow::{Context as AnyhowContext, Result};
use collector::{CollectSummary, CollectedData, Engine};

use crate::Context;
use crate::cli::CollectArgs;
use crate::rules::RuleSet;
use crate::snapshot::Snapshot;
use crate::ui;

pub fn run(ctx: &Context, args: CollectArgs) -> Result<()> {
    let snapshot = Snapshot::load(&args.snapshot)?;
    let deployment_id = snapshot.deployment_id.clone();

    let rules = match &args.rules {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::catch_all(),
    };

    let (facts, summary) = collect_facts(snapshot, rules)
        .with_context(|| format!("Collection failed for deployment {}", deployment_id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&facts)?);
        return Ok(());
    }

    print_facts(ctx, &deployment_id, &facts, &summary);
    Ok(())
}

fn print_facts(ctx: &Context, deployment_id: &str, facts: &CollectedData, summary: &CollectSummary) {
    ui::header(&format!("Resources: {}", deployment_id));

    if facts.is_empty() {
        ui::dim("No facts collected");
    }
    for (key, value) in facts {
        let rendered = value.to_string();
        if ctx.verbose > 0 {
            ui::kv(key, &rendered);
        } else {
            ui::kv(key, &ui::truncate(&rendered, 80));
        }
    }

    if ctx.quiet {
        return;
    }
    println!();
    if summary.is_complete() {
        ui::success(&format!("{} instances handled", summary.handled));
    } else {
        ui::info(&format!(
            "{} of {} instances handled, {} matched no rule",
            summary.handled, summary.visited, summary.unmatched
        ));
    }
}

/// Run one collection pass over a snapshot
pub fn collect_facts(snapshot: Snapshot, rules: RuleSet) -> Result<(CollectedData, CollectSummary)> {
    let engine = Engine::new(rules.into_chain());
    log::debug!("Handler chain: {:?}", engine.chain().names());

    let mut traversal = snapshot.into_context();
    let summary = engine.run(&mut traversal)?;
    Ok((traversal.into_collected_data(), summary))
}
