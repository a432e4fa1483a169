//! Oracle factory — selects the correct backend based on config.

use std::sync::Arc;
use std::time::Duration;
use policybot_config::OracleConfig;
use policybot_core::error::OracleError;
use policybot_core::oracle::Oracle;
use crate::openai_compat::{GROQ_BASE_URL, OLLAMA_BASE_URL, OPENAI_BASE_URL, OpenAiCompatOracle};

/// Build the configured oracle.
///
/// Fails with [`OracleError::NotConfigured`] when the backend needs an API
/// key and none is set, or when a base URL cannot be determined.
pub fn build_from_config(config: &OracleConfig) -> Result<Arc<dyn Oracle>, OracleError> {
    let name = config.provider.as_str();

    let base_url = match &config.api_url {
        Some(url) => url.clone(),
        None => default_base_url(name)
            .ok_or_else(|| {
                OracleError::NotConfigured(format!(
                    "provider '{name}' has no default URL; set oracle.api_url"
                ))
            })?
            .to_string(),
    };

    let api_key = match (&config.api_key, requires_api_key(name)) {
        (Some(key), _) => key.clone(),
        (None, false) => String::new(),
        (None, true) => {
            return Err(OracleError::NotConfigured(format!(
                "no API key for '{name}'; set GROQ_API_KEY or oracle.api_key"
            )));
        }
    };

    tracing::debug!(oracle = %name, model = %config.model, %base_url, "Building oracle");

    let oracle = OpenAiCompatOracle::new(
        name,
        base_url,
        api_key,
        &config.model,
        Duration::from_secs(config.timeout_secs),
    )?
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens);

    Ok(Arc::new(oracle))
}

/// Get the default base URL for well-known backends.
fn default_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "groq" => Some(GROQ_BASE_URL),
        "openai" => Some(OPENAI_BASE_URL),
        "ollama" => Some(OLLAMA_BASE_URL),
        "vllm" => Some("http://localhost:8000/v1"),
        "llamacpp" | "llama.cpp" => Some("http://localhost:8080/v1"),
        _ => None,
    }
}

fn requires_api_key(provider_name: &str) -> bool {
    matches!(provider_name, "groq" | "openai")
}
