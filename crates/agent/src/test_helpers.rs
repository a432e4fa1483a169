//! Deterministic oracles and stub tools for loop tests.

use async_trait::async_trait;
use policybot_core::error::{OracleError, ToolError};
use policybot_core::observation::{Args, Payload};
use policybot_core::oracle::Oracle;
use policybot_core::tool::{Tool, ToolRegistry};
use std::collections::VecDeque;
use std::sync::Mutex;

/// An oracle that returns a sequence of scripted responses and records
/// every prompt it receives.
///
/// Panics if called more times than it has responses.
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, OracleError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(response) => Ok(response),
            None => panic!("ScriptedOracle: no response left for call #{}", prompts.len()),
        }
    }
}

/// An oracle whose transport always fails.
pub struct FailingOracle;

#[async_trait]
impl Oracle for FailingOracle {
    fn name(&self) -> &str {
        "failing"
    }

    async fn invoke(&self, _prompt: &str) -> Result<String, OracleError> {
        Err(OracleError::Network("connection refused".into()))
    }
}

/// Echoes its arguments back as the payload.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the arguments back."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}})
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        Ok(args.clone())
    }
}

/// Always fails with "stub failure".
pub struct FailTool;

#[async_trait]
impl Tool for FailTool {
    fn name(&self) -> &str {
        "fail"
    }

    fn description(&self) -> &str {
        "Always fails."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn invoke(&self, _args: &Args) -> Result<Payload, ToolError> {
        Err(ToolError::InvalidArguments("stub failure".into()))
    }
}

/// Returns a fixed payload under a chosen name.
pub struct StaticTool {
    name: String,
    payload: Payload,
}

impl StaticTool {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload: payload.as_object().cloned().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a fixed payload."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn invoke(&self, _args: &Args) -> Result<Payload, ToolError> {
        Ok(self.payload.clone())
    }
}

/// A registry with `echo` and `fail`.
pub fn stub_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool).unwrap();
    registry.register(FailTool).unwrap();
    registry
}
