//! Leave request tools, backed by an in-memory store.
//!
//! Requests start as `submitted` and can be approved, rejected, or
//! cancelled by id. The store is shared by all sessions; a `RwLock` keeps
//! each operation atomic.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use policybot_core::error::ToolError;
use policybot_core::observation::{Args, Payload};
use policybot_core::tool::Tool;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::args::{into_payload, optional_str, required_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Submitted,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status, accepting the aliases users tend to type.
    pub fn parse_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "open" | "submit" | "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "canceled" | "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveRequest {
    pub id: String,
    pub user: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaveError {
    #[error("user required")]
    UserRequired,

    #[error("reason required")]
    ReasonRequired,

    #[error("Invalid {field}: use ISO 'YYYY-MM-DD'.")]
    InvalidDate { field: &'static str },

    #[error("end_date must be on or after start_date")]
    EndBeforeStart,
}

impl From<LeaveError> for ToolError {
    fn from(e: LeaveError) -> Self {
        ToolError::InvalidArguments(e.to_string())
    }
}

/// The result of a status change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub request: LeaveRequest,
    pub previous_status: LeaveStatus,
}

/// In-memory leave request store.
#[derive(Default)]
pub struct LeaveStore {
    requests: RwLock<Vec<LeaveRequest>>,
}

impl LeaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a new `submitted` request.
    pub async fn create(
        &self,
        user: &str,
        start_date: &str,
        end_date: &str,
        reason: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let user = user.trim();
        let reason = reason.trim();
        if user.is_empty() {
            return Err(LeaveError::UserRequired);
        }
        if reason.is_empty() {
            return Err(LeaveError::ReasonRequired);
        }
        let start = parse_date(start_date, "start_date")?;
        let end = parse_date(end_date, "end_date")?;
        if end < start {
            return Err(LeaveError::EndBeforeStart);
        }

        let request = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
            start_date: start,
            end_date: end,
            reason: reason.to_string(),
            status: LeaveStatus::Submitted,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.requests.write().await.push(request.clone());
        tracing::debug!(id = %request.id, user = %request.user, "Leave request created");
        Ok(request)
    }

    /// Requests matching the filters, newest first.
    pub async fn list(&self, user: Option<&str>, status: Option<LeaveStatus>) -> Vec<LeaveRequest> {
        self.requests
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| user.is_none_or(|u| r.user == u))
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<LeaveRequest> {
        self.requests.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Set the status of a request. `None` if no request has that id.
    pub async fn set_status(&self, id: &str, status: LeaveStatus) -> Option<StatusChange> {
        let mut requests = self.requests.write().await;
        let request = requests.iter_mut().find(|r| r.id == id)?;
        let previous_status = request.status;
        request.status = status;
        request.updated_at = Some(Utc::now());
        Some(StatusChange {
            request: request.clone(),
            previous_status,
        })
    }

    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

fn parse_date(s: &str, field: &'static str) -> Result<NaiveDate, LeaveError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| LeaveError::InvalidDate { field })
}

/// Normalize a user name as typed in chat: "Alice’s" → "Alice".
pub fn clean_user(raw: &str) -> Option<String> {
    let normalized = raw.trim().replace('\u{2019}', "'");
    let stripped = normalized.strip_suffix("'s").unwrap_or(&normalized).trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

// ── Tools ────────────────────────────────────────────────────────────────

/// `create_leave_request {user, start_date, end_date, reason}` → `{created}`.
pub struct CreateLeaveRequestTool {
    store: Arc<LeaveStore>,
}

impl CreateLeaveRequestTool {
    pub fn new(store: Arc<LeaveStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreateLeaveRequestTool {
    fn name(&self) -> &str {
        "create_leave_request"
    }

    fn description(&self) -> &str {
        "Create a leave request (user, start_date, end_date, reason)."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user": { "type": "string", "description": "username or email" },
                "start_date": { "type": "string", "description": "ISO date YYYY-MM-DD" },
                "end_date": { "type": "string", "description": "ISO date YYYY-MM-DD" },
                "reason": { "type": "string", "description": "short reason for leave" }
            },
            "required": ["user", "start_date", "end_date", "reason"]
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let created = self
            .store
            .create(
                required_str(args, "user")?,
                required_str(args, "start_date")?,
                required_str(args, "end_date")?,
                required_str(args, "reason")?,
            )
            .await?;

        #[derive(Serialize)]
        struct Created {
            created: LeaveRequest,
        }
        into_payload(self.name(), &Created { created })
    }
}

/// `list_leave_requests {user?, status?}` → `{requests, count}`.
pub struct ListLeaveRequestsTool {
    store: Arc<LeaveStore>,
}

impl ListLeaveRequestsTool {
    pub fn new(store: Arc<LeaveStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListLeaveRequestsTool {
    fn name(&self) -> &str {
        "list_leave_requests"
    }

    fn description(&self) -> &str {
        "List leave requests; optional filters: user, status(submitted|approved|rejected|cancelled)."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user": { "type": "string" },
                "status": { "type": "string" }
            },
            "required": []
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let user = optional_str(args, "user")?.and_then(clean_user);
        let status = match optional_str(args, "status")? {
            Some(s) if !s.trim().is_empty() => Some(LeaveStatus::parse_alias(s).ok_or_else(|| {
                ToolError::InvalidArguments(
                    "status must be one of [approved, cancelled, rejected, submitted]".into(),
                )
            })?),
            _ => None,
        };

        let requests = self.store.list(user.as_deref(), status).await;

        #[derive(Serialize)]
        struct Listing {
            count: usize,
            requests: Vec<LeaveRequest>,
        }
        into_payload(
            self.name(),
            &Listing {
                count: requests.len(),
                requests,
            },
        )
    }
}

/// Approve, reject, or cancel a request by id.
pub struct SetLeaveStatusTool {
    store: Arc<LeaveStore>,
    status: LeaveStatus,
    name: &'static str,
    description: &'static str,
}

impl SetLeaveStatusTool {
    pub fn approve(store: Arc<LeaveStore>) -> Self {
        Self {
            store,
            status: LeaveStatus::Approved,
            name: "approve_leave_request",
            description: "Approve a leave request by id.",
        }
    }

    pub fn reject(store: Arc<LeaveStore>) -> Self {
        Self {
            store,
            status: LeaveStatus::Rejected,
            name: "reject_leave_request",
            description: "Reject a leave request by id.",
        }
    }

    pub fn cancel(store: Arc<LeaveStore>) -> Self {
        Self {
            store,
            status: LeaveStatus::Cancelled,
            name: "cancel_leave_request",
            description: "Cancel a leave request by id.",
        }
    }
}

#[async_trait]
impl Tool for SetLeaveStatusTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "leave request id (uuid)" }
            },
            "required": ["id"]
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let id = required_str(args, "id")?.trim();
        let value = match self.store.set_status(id, self.status).await {
            Some(change) => serde_json::json!({
                "ok": true,
                "request": change.request,
                "previous_status": change.previous_status,
            }),
            None => serde_json::json!({
                "ok": false,
                "error": "request not found",
                "id": id,
            }),
        };
        into_payload(self.name, &value)
    }
}
