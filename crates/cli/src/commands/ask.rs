//! `policybot ask` — run one reasoning session.

use std::sync::Arc;

use policybot_agent::{AgentLoop, AgentResult};
use policybot_config::AppConfig;
use policybot_core::error::OracleError;
use policybot_core::trace::{Trace, TraceEntry};

pub async fn run(
    message: String,
    max_steps: Option<u32>,
    show_trace: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let oracle = match policybot_providers::build_from_config(&config.oracle) {
        Ok(oracle) => oracle,
        Err(OracleError::NotConfigured(reason)) => {
            eprintln!();
            eprintln!("  ERROR: {reason}");
            eprintln!();
            eprintln!("  Set one of these environment variables (or put it in .env):");
            eprintln!("    GROQ_API_KEY      = 'gsk_...'");
            eprintln!("    POLICYBOT_API_KEY = '...'   (any provider)");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            return Err("No oracle configured. See above for setup instructions.".into());
        }
        Err(e) => return Err(e.into()),
    };

    let tools = Arc::new(policybot_tools::default_registry(&config.tools)?);
    let agent = AgentLoop::from_config(oracle, tools, &config.agent);
    let budget = max_steps.unwrap_or(agent.max_steps());

    let result = agent.run_with_budget(&message, budget).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(&result, show_trace))?);
    } else {
        println!("{}", result.answer);
        if show_trace {
            println!();
            print!("{}", render_trace(&result.trace));
        }
    }

    Ok(())
}

/// The result as JSON, with the trace dropped unless requested.
fn to_json(result: &AgentResult, include_trace: bool) -> serde_json::Value {
    let mut value = serde_json::to_value(result).unwrap_or_default();
    if !include_trace && let Some(object) = value.as_object_mut() {
        object.remove("trace");
    }
    value
}

/// One line per trace entry.
fn render_trace(trace: &Trace) -> String {
    let mut out = String::new();
    for entry in trace {
        let line = match entry {
            TraceEntry::PlanRecorded { step, plan } => format!(
                "[{step}] plan        {}",
                serde_json::to_string(plan).unwrap_or_default()
            ),
            TraceEntry::ToolInvoked { step, name, args } => format!(
                "[{step}] tool        {name} {}",
                serde_json::Value::Object(args.clone())
            ),
            TraceEntry::Observed { step, observation } => {
                format!("[{step}] observation {}", observation.to_json())
            }
            TraceEntry::SynthesisRecorded { from_tool } => {
                format!("[-] synthesis   from {from_tool}")
            }
            TraceEntry::ErrorRecorded { step, message } => {
                format!("[{step}] error       {message}")
            }
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
