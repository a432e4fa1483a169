//! Context accumulator: folds the latest observation into the next
//! planning context.

use policybot_core::observation::{Observation, truncate_chars};

pub const DEFAULT_OBSERVATION_CAP: usize = 2000;

#[derive(Debug, Clone, Copy)]
pub struct ContextAccumulator {
    cap_chars: usize,
}

impl ContextAccumulator {
    pub fn new(cap_chars: usize) -> Self {
        Self { cap_chars }
    }

    pub fn cap_chars(&self) -> usize {
        self.cap_chars
    }

    /// The original request followed by the capped JSON of the most recent
    /// observation. Earlier observations are never included.
    pub fn fold(&self, user_message: &str, last: &Observation) -> String {
        let json = last.to_json();
        format!(
            "{user_message}\n(Previous result: {})",
            truncate_chars(&json, self.cap_chars)
        )
    }
}

impl Default for ContextAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_OBSERVATION_CAP)
    }
}
