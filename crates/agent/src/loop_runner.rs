//! The loop controller: plan, dispatch, observe, repeat, within a step budget.

use std::sync::Arc;

use policybot_config::AgentConfig;
use policybot_core::observation::Observation;
use policybot_core::oracle::Oracle;
use policybot_core::plan::Plan;
use policybot_core::tool::ToolRegistry;
use policybot_core::trace::{Trace, TraceEntry};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ContextAccumulator;
use crate::dispatcher::{Dispatch, Dispatcher};
use crate::planner::PlannerAdapter;
use crate::synthesizer::SynthesizerAdapter;

pub const DEFAULT_MAX_STEPS: u32 = 3;
pub const UNSUPPORTED_ACTION_ANSWER: &str = "Planner returned an unsupported action.";
pub const NO_DECISION_ANSWER: &str = "I couldn't decide on a next action.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Final,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The planner returned a final answer.
    Answered,
    /// Unknown tool or unsupported action.
    Fatal,
    /// The budget ran out and the last observation was synthesized.
    Synthesized,
    /// The budget ran out with nothing to synthesize.
    Exhausted,
}

/// The outcome of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,

    pub answer: String,

    /// Planning invocations completed, never more than the budget.
    #[serde(rename = "steps")]
    pub steps_taken: u32,

    pub trace: Trace,

    #[serde(skip)]
    pub stop_reason: StopReason,

    #[serde(skip)]
    pub session_id: Uuid,
}

/// The tool-augmented reasoning loop.
///
/// Holds no per-session state: one `AgentLoop` can serve concurrent runs.
pub struct AgentLoop {
    planner: PlannerAdapter,
    dispatcher: Dispatcher,
    accumulator: ContextAccumulator,
    synthesizer: SynthesizerAdapter,
    max_steps: u32,
}

impl AgentLoop {
    /// Create a loop using `oracle` for both planning and synthesis.
    pub fn new(oracle: Arc<dyn Oracle>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            planner: PlannerAdapter::new(oracle.clone(), &tools),
            dispatcher: Dispatcher::new(tools),
            accumulator: ContextAccumulator::default(),
            synthesizer: SynthesizerAdapter::new(oracle),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Create a loop with budgets and caps from `[agent]` config.
    pub fn from_config(oracle: Arc<dyn Oracle>, tools: Arc<ToolRegistry>, config: &AgentConfig) -> Self {
        let mut agent = Self::new(oracle.clone(), tools).with_max_steps(config.max_steps);
        agent.accumulator = ContextAccumulator::new(config.observation_cap_chars);
        agent.synthesizer = SynthesizerAdapter::new(oracle)
            .with_observation_cap(config.synthesis_observation_cap_chars)
            .with_echo_cap(config.synthesis_echo_cap_chars);
        agent
    }

    /// Set the default step budget.
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    /// Use a separate oracle for synthesis.
    pub fn with_synthesizer(mut self, synthesizer: SynthesizerAdapter) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.dispatcher.tools()
    }

    /// Run one session with the default budget.
    pub async fn run(&self, user_message: &str) -> AgentResult {
        self.run_with_budget(user_message, self.max_steps).await
    }

    /// Run one session with an explicit step budget.
    ///
    /// Always returns a result; every failure is folded into the answer.
    pub async fn run_with_budget(&self, user_message: &str, max_steps: u32) -> AgentResult {
        let max_steps = if max_steps == 0 {
            warn!("Step budget of 0 raised to 1");
            1
        } else {
            max_steps
        };

        let session = Session {
            id: Uuid::new_v4(),
            trace: Trace::new(),
        };
        info!(session_id = %session.id, max_steps, "Session started");
        self.drive(session, user_message, max_steps).await
    }

    async fn drive(&self, mut session: Session, user_message: &str, max_steps: u32) -> AgentResult {
        let mut context = user_message.to_string();
        let mut last: Option<(String, Observation)> = None;

        for step in 1..=max_steps {
            debug!(session_id = %session.id, step, "Planning");
            let plan = self.planner.plan(&context).await;
            session.trace.record(TraceEntry::PlanRecorded {
                step,
                plan: plan.clone(),
            });

            match plan {
                Plan::Final { answer } => {
                    return session.finish(answer, step, StopReason::Answered);
                }
                Plan::Unsupported { requested } => {
                    warn!(session_id = %session.id, step, action = %requested, "Unsupported planner action");
                    session.trace.record(TraceEntry::ErrorRecorded {
                        step,
                        message: UNSUPPORTED_ACTION_ANSWER.to_string(),
                    });
                    return session.finish(UNSUPPORTED_ACTION_ANSWER.to_string(), step, StopReason::Fatal);
                }
                Plan::ToolCall { name, args } => {
                    debug!(session_id = %session.id, step, tool = %name, "Dispatching");
                    match self
                        .dispatcher
                        .dispatch(step, &name, &args, &mut session.trace)
                        .await
                    {
                        Dispatch::UnknownTool(obs) => {
                            let answer = obs.error_message().unwrap_or_default().to_string();
                            return session.finish(answer, step, StopReason::Fatal);
                        }
                        Dispatch::Observed(obs) => {
                            context = self.accumulator.fold(user_message, &obs);
                            last = Some((name, obs));
                        }
                    }
                }
            }
        }

        warn!(session_id = %session.id, max_steps, "Step budget exhausted");
        match last {
            Some((tool, obs)) => {
                let answer = self.synthesizer.synthesize(user_message, &tool, &obs).await;
                session
                    .trace
                    .record(TraceEntry::SynthesisRecorded { from_tool: tool });
                session.finish(answer, max_steps, StopReason::Synthesized)
            }
            None => session.finish(NO_DECISION_ANSWER.to_string(), max_steps, StopReason::Exhausted),
        }
    }
}

/// Session-local state, created per run and consumed by `finish`.
struct Session {
    id: Uuid,
    trace: Trace,
}

impl Session {
    fn finish(self, answer: String, steps_taken: u32, stop_reason: StopReason) -> AgentResult {
        info!(
            session_id = %self.id,
            steps = steps_taken,
            trace_len = self.trace.len(),
            ?stop_reason,
            "Session finished"
        );
        AgentResult {
            kind: ResultKind::Final,
            answer,
            steps_taken,
            trace: self.trace,
            stop_reason,
            session_id: self.id,
        }
    }
}
