//! Built-in tool implementations for PolicyBot.
//!
//! Tools give the agent its view of the company: the holiday calendar,
//! leave requests, and a small set of allow-listed HTTP endpoints.

mod args;
pub mod holiday;
pub mod http;
pub mod leave;

use std::sync::Arc;

use policybot_config::ToolsConfig;
use policybot_core::tool::ToolRegistry;

pub use holiday::{HolidayCalendar, parse_iso_date};
pub use http::HttpAccess;
pub use leave::{LeaveStatus, LeaveStore};

/// Create the default registry with a fresh leave store.
pub fn default_registry(config: &ToolsConfig) -> policybot_core::Result<ToolRegistry> {
    registry_with_store(config, Arc::new(LeaveStore::new()))
}

/// Create the default registry around an existing leave store.
///
/// Registration order is the order the planner sees in its catalogue.
pub fn registry_with_store(
    config: &ToolsConfig,
    store: Arc<LeaveStore>,
) -> policybot_core::Result<ToolRegistry> {
    let calendar = Arc::new(HolidayCalendar::from_month_days(&config.holidays));
    let access = Arc::new(HttpAccess::new(
        config.http_allowlist.clone(),
        config.http_timeout_secs,
    )?);

    let mut registry = ToolRegistry::new();
    registry.register(holiday::CheckHolidayTool::new(calendar.clone()))?;
    registry.register(holiday::ListHolidaysTool::new(calendar.clone()))?;
    registry.register(holiday::NextHolidaysTool::new(calendar))?;
    registry.register(leave::CreateLeaveRequestTool::new(store.clone()))?;
    registry.register(leave::ListLeaveRequestsTool::new(store.clone()))?;
    registry.register(leave::SetLeaveStatusTool::approve(store.clone()))?;
    registry.register(leave::SetLeaveStatusTool::reject(store.clone()))?;
    registry.register(leave::SetLeaveStatusTool::cancel(store))?;
    registry.register(http::HttpGetTool::new(access.clone()))?;
    registry.register(http::HttpPostTool::new(access))?;

    tracing::debug!(tools = registry.len(), "Default tool registry built");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_registry_has_every_tool_once_in_order() {
        let registry = default_registry(&ToolsConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "check_holiday",
                "list_holidays",
                "next_holidays",
                "create_leave_request",
                "list_leave_requests",
                "approve_leave_request",
                "reject_leave_request",
                "cancel_leave_request",
                "http_get",
                "http_post",
            ]
        );
    }

    #[test]
    fn descriptors_carry_object_schemas() {
        let registry = default_registry(&ToolsConfig::default()).unwrap();
        for descriptor in registry.describe_all() {
            assert_eq!(descriptor.input_schema["type"], "object", "{}", descriptor.name);
            assert!(!descriptor.description.is_empty());
        }
    }

    #[tokio::test]
    async fn tools_share_the_leave_store() {
        let store = Arc::new(LeaveStore::new());
        let registry = registry_with_store(&ToolsConfig::default(), store.clone()).unwrap();

        let args = json!({
            "user": "alice",
            "start_date": "2025-03-03",
            "end_date": "2025-03-04",
            "reason": "move"
        });
        registry
            .lookup("create_leave_request")
            .unwrap()
            .invoke(args.as_object().unwrap())
            .await
            .unwrap();

        let listed = registry
            .lookup("list_leave_requests")
            .unwrap()
            .invoke(&Default::default())
            .await
            .unwrap();
        assert_eq!(listed["count"], 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn configured_holidays_replace_the_default_calendar() {
        let mut config = ToolsConfig::default();
        config.holidays.insert("03-17".into(), "Spring Day".into());
        let registry = default_registry(&config).unwrap();

        let out = registry
            .lookup("list_holidays")
            .unwrap()
            .invoke(json!({"year": 2025}).as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(out["count"], 1);
        assert_eq!(out["holidays"][0]["name"], "Spring Day");
    }
}
