//! Dispatcher: resolves a planned tool call and turns its outcome into an
//! [`Observation`].
//!
//! Every call appends exactly one `ToolInvoked` and one `Observed` entry to
//! the trace, in that order, whether the tool succeeds, fails, or does not
//! exist.

use std::sync::Arc;

use policybot_core::observation::{Args, Observation};
use policybot_core::tool::ToolRegistry;
use policybot_core::trace::{Trace, TraceEntry};
use tracing::{debug, warn};

/// The outcome of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The tool ran; its result (or failure) is the observation.
    Observed(Observation),

    /// No tool has this name. The run must stop.
    UnknownTool(Observation),
}

impl Dispatch {
    pub fn observation(&self) -> &Observation {
        match self {
            Self::Observed(obs) | Self::UnknownTool(obs) => obs,
        }
    }
}

pub struct Dispatcher {
    tools: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Invoke `name` with `args` for `step`, recording the call and its observation.
    pub async fn dispatch(&self, step: u32, name: &str, args: &Args, trace: &mut Trace) -> Dispatch {
        trace.record(TraceEntry::ToolInvoked {
            step,
            name: name.to_string(),
            args: args.clone(),
        });

        let outcome = match self.tools.lookup(name) {
            None => {
                warn!(step, tool = %name, "Planner requested an unknown tool");
                Dispatch::UnknownTool(Observation::error(format!("Unknown tool '{name}'.")))
            }
            Some(tool) => match tool.invoke(args).await {
                Ok(payload) => {
                    debug!(step, tool = %name, keys = payload.len(), "Tool succeeded");
                    Dispatch::Observed(Observation::Payload(payload))
                }
                Err(e) => {
                    warn!(step, tool = %name, error = %e, "Tool failed");
                    Dispatch::Observed(Observation::error(e.to_string()))
                }
            },
        };

        trace.record(TraceEntry::Observed {
            step,
            observation: outcome.observation().clone(),
        });
        outcome
    }
}
