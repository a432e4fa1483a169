//! The PolicyBot reasoning loop.
//!
//! Each step the planner oracle picks either a final answer or one tool
//! call. Tool results are folded back into the next planning prompt until
//! an answer arrives or the step budget runs out, at which point the last
//! observation is synthesized into prose. Every decision is recorded in
//! the session's [`Trace`](policybot_core::Trace).

pub mod context;
pub mod dispatcher;
pub mod loop_runner;
pub mod planner;
pub mod prompts;
pub mod synthesizer;

#[cfg(test)]
mod test_helpers;

pub use context::ContextAccumulator;
pub use dispatcher::{Dispatch, Dispatcher};
pub use loop_runner::{AgentLoop, AgentResult, ResultKind, StopReason};
pub use planner::PlannerAdapter;
pub use synthesizer::SynthesizerAdapter;
