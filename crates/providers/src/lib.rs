//! Oracle implementations for PolicyBot.
//!
//! All backends implement the `policybot_core::Oracle` trait.
//! [`build_from_config`] selects the backend from configuration.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatOracle;
pub use router::build_from_config;
