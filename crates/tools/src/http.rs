//! HTTP GET/POST tools restricted to an allowlist of URL prefixes.
//!
//! An entry matches on parsed components: same scheme, host and port, and
//! a path under the entry's path at a segment boundary. URLs carrying
//! userinfo are never allowed.
//!
//! Output is `{status, json}`. Bodies that are not JSON come back as
//! `{status, json: {text}}` with the text capped at 2000 characters.

use async_trait::async_trait;
use reqwest::Url;
use policybot_core::error::ToolError;
use policybot_core::observation::{Args, Payload, truncate_chars};
use policybot_core::tool::Tool;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::args::{into_payload, optional_object, required_str};

const TEXT_CAP_CHARS: usize = 2000;

/// Shared client and allowlist for the HTTP tools.
pub struct HttpAccess {
    client: reqwest::Client,
    allowlist: Vec<String>,
    allowed: Vec<Url>,
    timeout_secs: u64,
}

impl HttpAccess {
    pub fn new(allowlist: Vec<String>, timeout_secs: u64) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "http".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        let allowed = allowlist
            .iter()
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| match Url::parse(entry) {
                Ok(url) if url.has_host() => Some(url),
                _ => {
                    tracing::warn!(%entry, "Ignoring unparseable allowlist entry");
                    None
                }
            })
            .collect();
        Ok(Self {
            client,
            allowlist,
            allowed,
            timeout_secs,
        })
    }

    pub fn allowlist(&self) -> &[String] {
        &self.allowlist
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.permit(url).is_some()
    }

    fn permit(&self, url: &str) -> Option<Url> {
        let url = Url::parse(url).ok()?;
        if !url.username().is_empty() || url.password().is_some() {
            return None;
        }
        self.allowed
            .iter()
            .any(|entry| entry_covers(entry, &url))
            .then_some(url)
    }

    fn check(&self, tool_name: &str, url: &str) -> Result<Url, ToolError> {
        self.permit(url).ok_or_else(|| {
            tracing::warn!(tool = %tool_name, %url, "Blocked URL outside allowlist");
            ToolError::PermissionDenied {
                tool_name: tool_name.to_string(),
                reason: "URL not allowed".into(),
            }
        })
    }

    async fn send(
        &self,
        tool_name: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Payload, ToolError> {
        let response = request.send().await.map_err(|e| self.map_error(tool_name, e))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_error(tool_name, e))?;

        tracing::debug!(tool = %tool_name, status, bytes = text.len(), "HTTP response");
        into_payload(
            tool_name,
            &serde_json::json!({ "status": status, "json": decode_body(&text) }),
        )
    }

    fn map_error(&self, tool_name: &str, e: reqwest::Error) -> ToolError {
        if e.is_timeout() {
            ToolError::Timeout {
                tool_name: tool_name.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            ToolError::ExecutionFailed {
                tool_name: tool_name.to_string(),
                reason: e.to_string(),
            }
        }
    }

    fn describe_allowlist(&self) -> String {
        self.allowlist
            .iter()
            .map(|p| p.trim_start_matches("https://").trim_start_matches("http://"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn entry_covers(entry: &Url, url: &Url) -> bool {
    if entry.scheme() != url.scheme()
        || entry.host_str() != url.host_str()
        || entry.port_or_known_default() != url.port_or_known_default()
    {
        return false;
    }
    let base = entry.path().trim_end_matches('/');
    let path = url.path();
    base.is_empty() || path == base || path.starts_with(&format!("{base}/"))
}

/// Parse a body as JSON, or wrap the leading text.
fn decode_body(text: &str) -> Value {
    serde_json::from_str(text)
        .unwrap_or_else(|_| serde_json::json!({ "text": truncate_chars(text, TEXT_CAP_CHARS) }))
}

/// `http_get {url, params?}`.
pub struct HttpGetTool {
    access: Arc<HttpAccess>,
    description: String,
}

impl HttpGetTool {
    pub fn new(access: Arc<HttpAccess>) -> Self {
        let description = format!("HTTP GET to allowed URLs ({}).", access.describe_allowlist());
        Self {
            access,
            description,
        }
    }
}

#[async_trait]
impl Tool for HttpGetTool {
    fn name(&self) -> &str {
        "http_get"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string" },
                "params": { "type": "object", "description": "query string parameters" }
            },
            "required": ["url"]
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let url = self.access.check(self.name(), required_str(args, "url")?)?;

        tracing::info!(tool = %self.name(), %url, "HTTP GET");
        let mut request = self.access.client.get(url);
        if let Some(params) = optional_object(args, "params")? {
            let query: Vec<(String, String)> = params
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => (k.clone(), s.clone()),
                    other => (k.clone(), other.to_string()),
                })
                .collect();
            request = request.query(&query);
        }
        self.access.send(self.name(), request).await
    }
}

/// `http_post {url, json?}`.
pub struct HttpPostTool {
    access: Arc<HttpAccess>,
    description: String,
}

impl HttpPostTool {
    pub fn new(access: Arc<HttpAccess>) -> Self {
        let description = format!("HTTP POST to allowed URLs ({}).", access.describe_allowlist());
        Self {
            access,
            description,
        }
    }
}

#[async_trait]
impl Tool for HttpPostTool {
    fn name(&self) -> &str {
        "http_post"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string" },
                "json": { "type": "object", "description": "request body" }
            },
            "required": ["url"]
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let url = self.access.check(self.name(), required_str(args, "url")?)?;
        let body = optional_object(args, "json")?.cloned().unwrap_or_default();

        tracing::info!(tool = %self.name(), %url, "HTTP POST");
        let request = self.access.client.post(url).json(&body);
        self.access.send(self.name(), request).await
    }
}
