//! Plans — the planner's decision for one step.
//!
//! The planner oracle is asked for exactly one of two JSON shapes:
//!
//! ```json
//! {"action": "final", "answer": "..."}
//! {"action": "tool", "name": "...", "args": {...}}
//! ```
//!
//! A well-formed object carrying any other `action` string is kept as
//! [`Plan::Unsupported`] so the loop can terminate on it; everything else is
//! a [`PlanParseError`].

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use crate::error::PlanParseError;
use crate::observation::Args;

/// Serializes in the wire shape it was parsed from. An unsupported plan
/// keeps the planner's own tag: `{"action": "<requested>"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Answer the user directly.
    Final { answer: String },

    /// Invoke a tool with the given arguments.
    ToolCall { name: String, args: Args },

    /// The planner used an action tag the loop does not support.
    Unsupported { requested: String },
}

impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Final { answer } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("action", "final")?;
                map.serialize_entry("answer", answer)?;
                map.end()
            }
            Self::ToolCall { name, args } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("action", "tool")?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("args", args)?;
                map.end()
            }
            Self::Unsupported { requested } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("action", requested)?;
                map.end()
            }
        }
    }
}

/// The accepted wire shapes, used only for parsing.
#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PlanWire {
    Final {
        answer: String,
    },
    Tool {
        name: String,
        #[serde(default)]
        args: Args,
    },
}

impl Plan {
    /// Build a final-answer plan.
    pub fn final_answer(answer: impl Into<String>) -> Self {
        Self::Final {
            answer: answer.into(),
        }
    }

    /// Build a tool-call plan.
    pub fn tool_call(name: impl Into<String>, args: Args) -> Self {
        Self::ToolCall {
            name: name.into(),
            args,
        }
    }

    /// Parse raw planner output as strict JSON.
    ///
    /// Surrounding whitespace is ignored; nothing else is forgiven.
    pub fn parse(raw: &str) -> Result<Self, PlanParseError> {
        let value: Value = serde_json::from_str(raw.trim())?;
        let object = value.as_object().ok_or(PlanParseError::NotAnObject)?;
        let action = object
            .get("action")
            .and_then(Value::as_str)
            .ok_or(PlanParseError::MissingAction)?
            .to_string();

        if action != "final" && action != "tool" {
            return Ok(Self::Unsupported { requested: action });
        }

        let wire: PlanWire =
            serde_json::from_value(value).map_err(|e| PlanParseError::InvalidShape {
                action: action.clone(),
                reason: e.to_string(),
            })?;

        Ok(match wire {
            PlanWire::Final { answer } => Self::Final { answer },
            PlanWire::Tool { name, args } => Self::ToolCall { name, args },
        })
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final { .. })
    }
}
