use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resmgr")]
#[command(version)]
#[command(about = "Collect deployment resource usage and run operations on node instances", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/resmgr/config.toml)
    #[arg(long, global = true, env = "RESMGR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Collect resource facts from a deployment snapshot
    Collect(CollectArgs),

    /// Run an operation on a node instance and wait for its result
    Exec(ExecArgs),

    /// Wait for a running execution and show the node instance's result
    Wait(WaitArgs),

    /// Query an execution's status once
    Status {
        /// Execution ID
        execution_id: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct CollectArgs {
    /// Deployment snapshot (JSON)
    pub snapshot: PathBuf,

    /// Rules file (TOML); defaults to recording every instance
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Print facts as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PollArgs {
    /// Seconds to wait for completion (-1 waits forever)
    #[arg(long, allow_hyphen_values = true)]
    pub timeout: Option<i64>,

    /// Seconds between status checks
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Args)]
pub struct ExecArgs {
    /// Deployment ID
    pub deployment: String,

    /// Node instance to run the operation on
    pub node_instance: String,

    /// Operation name (e.g. cloudify.interfaces.lifecycle.start)
    pub operation: String,

    /// Operation inputs as a JSON object
    #[arg(short, long)]
    pub inputs: Option<String>,

    /// Workflow to run (default from config: execute_operation)
    #[arg(short, long)]
    pub workflow: Option<String>,

    /// Submit only, print the execution ID and exit
    #[arg(long)]
    pub no_wait: bool,

    /// Queue behind other running executions instead of forcing
    #[arg(long)]
    pub no_force: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub poll: PollArgs,
}

#[derive(Args)]
pub struct WaitArgs {
    /// Execution ID
    pub execution_id: String,

    /// Node instance whose runtime properties to show
    pub node_instance: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub poll: PollArgs,
}
