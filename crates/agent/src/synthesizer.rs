//! Synthesizer adapter: turns the last observation into prose once the
//! step budget runs out.

use std::sync::Arc;

use policybot_core::observation::{Observation, truncate_chars};
use policybot_core::oracle::Oracle;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::prompts;

pub const ECHO_PREFIX: &str = "Here is what I found: ";

#[derive(Deserialize)]
struct SynthesisWire {
    #[serde(rename = "finalAnswer", alias = "final_answer")]
    final_answer: String,
}

pub struct SynthesizerAdapter {
    oracle: Arc<dyn Oracle>,
    observation_cap_chars: usize,
    echo_cap_chars: usize,
}

impl SynthesizerAdapter {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            observation_cap_chars: 6000,
            echo_cap_chars: 500,
        }
    }

    /// Cap on the observation JSON embedded in the prompt.
    pub fn with_observation_cap(mut self, chars: usize) -> Self {
        self.observation_cap_chars = chars;
        self
    }

    /// Cap on the observation JSON echoed by the fallback answer.
    pub fn with_echo_cap(mut self, chars: usize) -> Self {
        self.echo_cap_chars = chars;
        self
    }

    /// Produce a final answer from the most recent tool output. Never fails.
    pub async fn synthesize(
        &self,
        user_message: &str,
        tool_name: &str,
        observation: &Observation,
    ) -> String {
        let output = observation.to_json();
        let prompt =
            prompts::render_synthesizer(user_message, tool_name, &output, self.observation_cap_chars);

        let raw = match self.oracle.invoke(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(oracle = %self.oracle.name(), error = %e, "Synthesizer oracle call failed");
                return self.echo(&output);
            }
        };

        match serde_json::from_str::<SynthesisWire>(raw.trim()) {
            Ok(wire) => {
                debug!(tool = %tool_name, "Synthesized final answer");
                wire.final_answer
            }
            Err(e) => {
                warn!(error = %e, raw = %raw, "Could not parse synthesizer output");
                self.echo(&output)
            }
        }
    }

    fn echo(&self, output: &str) -> String {
        format!("{ECHO_PREFIX}{}", truncate_chars(output, self.echo_cap_chars))
    }
}
