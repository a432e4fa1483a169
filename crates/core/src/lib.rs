//! # PolicyBot Core
//!
//! Domain types, traits, and error definitions for the PolicyBot
//! tool-augmented reasoning loop. This crate has **no I/O dependencies**.
//! It defines the model that the agent loop, the tools, and the oracle
//! backends implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Oracle`] — the text-in/text-out reasoning backend
//! - [`Tool`] — a capability the planner may invoke
//!
//! Implementations live in their respective crates, and tests substitute
//! deterministic stubs.

pub mod error;
pub mod observation;
pub mod oracle;
pub mod plan;
pub mod tool;
pub mod trace;

// Re-export key types at crate root for ergonomics
pub use error::{Error, OracleError, PlanParseError, RegistryError, Result, ToolError};
pub use observation::{Args, Observation, Payload};
pub use oracle::Oracle;
pub use plan::Plan;
pub use tool::{Tool, ToolDescriptor, ToolRegistry};
pub use trace::{Trace, TraceEntry};
