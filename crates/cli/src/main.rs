//! PolicyBot CLI — the main entry point.
//!
//! Commands:
//! - `ask`      — Run one reasoning session and print the answer
//! - `tools`    — Show the tool catalogue the planner sees
//! - `holidays` — List company holidays
//! - `onboard`  — Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "policybot",
    about = "PolicyBot — HR and IT assistant with tools",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question; the agent may call tools before answering
    Ask {
        /// The request, e.g. "is 2025-07-04 a holiday?"
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Override the planning step budget
        #[arg(long)]
        max_steps: Option<u32>,

        /// Include the execution trace
        #[arg(long)]
        trace: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the registered tools
    Tools {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// List company holidays
    Holidays {
        /// Year to list (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Show the next N holidays from today instead
        #[arg(long, conflicts_with = "year")]
        next: Option<u32>,
    },

    /// Initialize configuration
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the answer
    let filter = if cli.verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Ask {
            message,
            max_steps,
            trace,
            json,
        } => commands::ask::run(message.join(" "), max_steps, trace, json).await?,
        Commands::Tools { json } => commands::tools::run(json).await?,
        Commands::Holidays { year, next } => commands::holidays::run(year, next).await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
