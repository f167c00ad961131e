mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toolwatch_core::config::Config;

#[derive(Parser)]
#[command(
    name = "toolwatch",
    about = "Tool reliability tracking — record tool executions, analyze the ecosystem",
    version,
    propagate_version = true
)]
struct Cli {
    /// Base directory for logs and derived documents (default: ~/.toolwatch)
    #[arg(long, global = true, env = "TOOLWATCH_DIR")]
    dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one tool execution (invoked by hooks after every tool call)
    Record {
        /// Tool name (mcp__server__operation or a shell command word)
        tool_name: String,
        /// Whether the execution succeeded (true | false)
        #[arg(action = clap::ArgAction::Set)]
        success: bool,
        /// Response time in milliseconds
        #[arg(allow_hyphen_values = true)]
        latency_ms: f64,
        /// Error output; pass "-" or an empty string when there is none
        #[arg(allow_hyphen_values = true)]
        error: String,
        /// Session identifier
        session_id: String,
    },

    /// Analyze both tool families and write the ecosystem reports
    Analyze,

    /// Show recorded per-tool statistics
    Stats {
        /// Restrict to one family (mcp | shell)
        #[arg(long)]
        family: Option<String>,

        /// Restrict to one tool
        #[arg(long)]
        tool: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Analyze => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::resolve(cli.dir.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Record {
            tool_name,
            success,
            latency_ms,
            error,
            session_id,
        } => cmd::record::run(&config, &tool_name, success, latency_ms, &error, &session_id),
        Commands::Analyze => cmd::analyze::run(&config, cli.json),
        Commands::Stats { family, tool } => {
            cmd::stats::run(&config, family.as_deref(), tool.as_deref(), cli.json)
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
