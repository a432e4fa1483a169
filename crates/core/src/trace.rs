//! Execution trace — the ordered record of one agent session.
//!
//! Entries are only ever appended. Their order is the order in which the
//! loop emitted them.

use serde::Serialize;
use crate::observation::{Args, Observation};
use crate::plan::Plan;

/// A single event in the execution trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    /// The planner's decision for a step.
    PlanRecorded { step: u32, plan: Plan },

    /// A tool was about to be invoked.
    ToolInvoked { step: u32, name: String, args: Args },

    /// The observation a tool call produced.
    Observed { step: u32, observation: Observation },

    /// The step budget ran out and the last observation was synthesized.
    SynthesisRecorded { from_tool: String },

    /// The run terminated on a loop-level error.
    ErrorRecorded { step: u32, message: String },
}

impl TraceEntry {
    /// The step this entry belongs to, if it is step-scoped.
    pub fn step(&self) -> Option<u32> {
        match self {
            Self::PlanRecorded { step, .. }
            | Self::ToolInvoked { step, .. }
            | Self::Observed { step, .. }
            | Self::ErrorRecorded { step, .. } => Some(*step),
            Self::SynthesisRecorded { .. } => None,
        }
    }
}

/// Append-only sequence of [`TraceEntry`] values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }

    /// Number of `PlanRecorded` entries.
    pub fn plans(&self) -> usize {
        self.iter()
            .filter(|e| matches!(e, TraceEntry::PlanRecorded { .. }))
            .count()
    }

    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceEntry;
    type IntoIter = std::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
