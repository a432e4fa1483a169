//! Oracle trait — the abstraction over the reasoning backend.
//!
//! An oracle takes rendered instruction text and returns raw text that is
//! *expected* (but not guaranteed) to be structured JSON. Both the planner
//! and the synthesizer talk to one.
//!
//! Implementations: OpenAI-compatible chat completions (Groq, OpenAI,
//! Ollama), and scripted stubs in tests.

use async_trait::async_trait;
use crate::error::OracleError;

#[async_trait]
pub trait Oracle: Send + Sync {
    /// A human-readable name for this oracle (e.g., "groq").
    fn name(&self) -> &str;

    /// Send one prompt and return the raw completion text.
    ///
    /// Exactly one backend request per call. Retries, if any, belong to the
    /// implementation's transport.
    async fn invoke(&self, prompt: &str) -> std::result::Result<String, OracleError>;
}
