//! Configuration loading, validation, and management for PolicyBot.
//!
//! Loads configuration from `~/.policybot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.policybot/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reasoning loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Planner/synthesizer backend
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum planning invocations per request
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Cap on the serialized observation folded into the next planner prompt
    #[serde(default = "default_observation_cap")]
    pub observation_cap_chars: usize,

    /// Cap on the serialized observation embedded in the synthesis prompt
    #[serde(default = "default_synthesis_observation_cap")]
    pub synthesis_observation_cap_chars: usize,

    /// Cap on the observation echoed when synthesis output is unusable
    #[serde(default = "default_synthesis_echo_cap")]
    pub synthesis_echo_cap_chars: usize,
}

fn default_max_steps() -> u32 {
    3
}
fn default_observation_cap() -> usize {
    2000
}
fn default_synthesis_observation_cap() -> usize {
    6000
}
fn default_synthesis_echo_cap() -> usize {
    500
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            observation_cap_chars: default_observation_cap(),
            synthesis_observation_cap_chars: default_synthesis_observation_cap(),
            synthesis_echo_cap_chars: default_synthesis_echo_cap(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Backend name: "groq", "openai", "ollama", or "custom"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL override (required for "custom")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// API key (usually supplied through the environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_oracle_timeout() -> u64 {
    60
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            api_key: None,
            temperature: 0.0,
            max_tokens: None,
            timeout_secs: default_oracle_timeout(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// URL prefixes the HTTP tools may call
    #[serde(default = "default_http_allowlist")]
    pub http_allowlist: Vec<String>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Company calendar override, `"MM-DD" = "Holiday Name"`.
    /// Empty means the built-in calendar.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub holidays: BTreeMap<String, String>,
}

fn default_http_allowlist() -> Vec<String> {
    vec!["http://localhost:8000".into(), "https://httpbin.org".into()]
}
fn default_http_timeout() -> u64 {
    15
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            http_allowlist: default_http_allowlist(),
            http_timeout_secs: default_http_timeout(),
            holidays: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.policybot/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `POLICYBOT_API_KEY`, then `GROQ_API_KEY` — oracle API key
    /// - `POLICYBOT_MODEL`, then `GROQ_MODEL` — model
    /// - `POLICYBOT_PROVIDER` — oracle backend
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("POLICYBOT_API_KEY").or_else(|| lookup("GROQ_API_KEY"))
            && !key.is_empty()
        {
            self.oracle.api_key = Some(key);
        }

        if let Some(model) = lookup("POLICYBOT_MODEL").or_else(|| lookup("GROQ_MODEL"))
            && !model.is_empty()
        {
            self.oracle.model = model;
        }

        if let Some(provider) = lookup("POLICYBOT_PROVIDER")
            && !provider.is_empty()
        {
            self.oracle.provider = provider;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".policybot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }

        if self.agent.observation_cap_chars == 0
            || self.agent.synthesis_observation_cap_chars == 0
            || self.agent.synthesis_echo_cap_chars == 0
        {
            return Err(ConfigError::ValidationError(
                "agent observation caps must be > 0".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            return Err(ConfigError::ValidationError(
                "oracle.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if let Some(bad) = self.tools.holidays.keys().find(|k| !is_month_day(k)) {
            return Err(ConfigError::ValidationError(format!(
                "tools.holidays key '{bad}' is not MM-DD"
            )));
        }

        Ok(())
    }

    /// Check if an oracle API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.oracle.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// `MM-DD` naming a real calendar day. Feb 29 is accepted.
fn is_month_day(s: &str) -> bool {
    let Some((m, d)) = s.split_once('-') else {
        return false;
    };
    if m.len() != 2 || d.len() != 2 {
        return false;
    }
    match (m.parse::<u32>(), d.parse::<u32>()) {
        // 2024 is a leap year
        (Ok(m), Ok(d)) => chrono::NaiveDate::from_ymd_opt(2024, m, d).is_some(),
        _ => false,
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.agent.max_steps, 3);
        assert_eq!(config.agent.observation_cap_chars, 2000);
        assert_eq!(config.agent.synthesis_echo_cap_chars, 500);
        assert_eq!(config.oracle.provider, "groq");
        assert_eq!(config.oracle.model, "llama-3.1-8b-instant");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.agent.max_steps, config.agent.max_steps);
        assert_eq!(parsed.tools.http_allowlist, config.tools.http_allowlist);
    }

    #[test]
    fn zero_max_steps_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.oracle.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_holiday_key_rejected() {
        let mut config = AppConfig::default();
        config.tools.holidays.insert("July 4".into(), "Independence Day".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("July 4"));

        config.tools.holidays.clear();
        config.tools.holidays.insert("13-01".into(), "Nope".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn impossible_holiday_dates_rejected() {
        for key in ["02-30", "04-31", "00-10", "06-00"] {
            let mut config = AppConfig::default();
            config.tools.holidays.insert(key.into(), "Nope".into());
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(key), "{key} should be rejected");
        }

        let mut config = AppConfig::default();
        config.tools.holidays.insert("02-29".into(), "Leap Day".into());
        config.tools.holidays.insert("12-31".into(), "New Year's Eve".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.oracle.provider, "groq");
    }

    #[test]
    fn load_from_file_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[agent]
max_steps = 5

[tools]
http_allowlist = ["http://localhost:9000"]

[tools.holidays]
"12-24" = "Christmas Eve"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.agent.max_steps, 5);
        assert_eq!(config.agent.observation_cap_chars, 2000);
        assert_eq!(config.tools.http_allowlist, vec!["http://localhost:9000"]);
        assert_eq!(config.tools.holidays["12-24"], "Christmas Eve");
        assert_eq!(config.oracle.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[agent\nmax_steps = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let env: HashMap<&str, &str> = [
            ("GROQ_API_KEY", "gsk-groq"),
            ("POLICYBOT_API_KEY", "gsk-primary"),
            ("GROQ_MODEL", "llama-3.3-70b-versatile"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.oracle.api_key.as_deref(), Some("gsk-primary"));
        assert_eq!(config.oracle.model, "llama-3.3-70b-versatile");
        assert_eq!(config.oracle.provider, "groq");
        assert!(config.has_api_key());
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let mut config = AppConfig::default();
        config.oracle.api_key = Some("gsk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("max_steps = 3"));
        assert!(toml_str.contains("llama-3.1-8b-instant"));
        assert!(!toml_str.contains("api_key"));
    }
}
