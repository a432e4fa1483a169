//! Planner adapter: one oracle call per step, parsed into a [`Plan`].
//!
//! Nothing here returns an error. Unparseable output and oracle failures
//! both degrade to a `Final` plan with a fixed apology.

use std::sync::Arc;

use policybot_core::oracle::Oracle;
use policybot_core::plan::Plan;
use policybot_core::tool::{ToolDescriptor, ToolRegistry};
use tracing::{debug, warn};

use crate::prompts;

pub const PARSE_FAILURE_ANSWER: &str = "Sorry, I couldn't parse a plan. Please rephrase.";
pub const PLANNER_UNAVAILABLE_ANSWER: &str =
    "Sorry, I couldn't reach the planner. Please try again later.";

pub struct PlannerAdapter {
    oracle: Arc<dyn Oracle>,
    catalogue: Vec<ToolDescriptor>,
}

impl PlannerAdapter {
    /// The catalogue is captured once; the registry does not change after startup.
    pub fn new(oracle: Arc<dyn Oracle>, tools: &ToolRegistry) -> Self {
        Self {
            oracle,
            catalogue: tools.describe_all(),
        }
    }

    pub fn prompt(&self, context: &str) -> String {
        prompts::render_planner(&self.catalogue, context)
    }

    /// Decide the next action for `context`.
    pub async fn plan(&self, context: &str) -> Plan {
        let prompt = self.prompt(context);

        let raw = match self.oracle.invoke(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(oracle = %self.oracle.name(), error = %e, "Planner oracle call failed");
                return Plan::final_answer(PLANNER_UNAVAILABLE_ANSWER);
            }
        };

        match Plan::parse(&raw) {
            Ok(plan) => {
                debug!(?plan, "Planner decided");
                plan
            }
            Err(e) => {
                warn!(error = %e, raw = %raw, "Could not parse planner output");
                Plan::final_answer(PARSE_FAILURE_ANSWER)
            }
        }
    }
}
