//! Instruction templates for the planner and synthesizer oracle calls.
//!
//! Rendering is pure: the same inputs always give byte-identical prompts.

use policybot_core::observation::truncate_chars;
use policybot_core::tool::ToolDescriptor;

const PLANNER_PREAMBLE: &str = "You are a helpful assistant with tools.
Decide the NEXT best action. Output strict JSON only.";

const PLANNER_RULES: &str = "Rules:
- If user asks to request PTO/leave, use \"create_leave_request\".
- If user asks to approve a leave, use \"approve_leave_request\" with { \"id\": \"<uuid>\" }.
- If user asks to reject a leave, use \"reject_leave_request\" with { \"id\": \"<uuid>\" }.
- If user asks to list leave requests, use \"list_leave_requests\" with { \"user\": \"<name>\", \"status\": \"<status>\" } if provided.
- If user asks to cancel a leave request, use \"cancel_leave_request\" with { \"id\": \"<uuid>\" }.
- If asking about a specific date being a holiday, use \"check_holiday\".
- If asking which holidays are coming up or fall in a year, use \"next_holidays\" or \"list_holidays\".
- If user explicitly asks to call an API endpoint, use \"http_get\" or \"http_post\".
- If the answer is obvious and needs no tool, respond with { \"action\": \"final\", \"answer\": \"...\" }.";

const PLANNER_SHAPES: &str = "Return JSON like:
{ \"action\":\"tool\",\"name\":\"check_holiday\",\"args\":{\"date_str\":\"2025-07-04\"} }
OR
{ \"action\":\"final\",\"answer\":\"...\" }";

const SYNTH_PREAMBLE: &str = "You ran one or more tools. Given the user message and the most recent tool output, write a final answer.
- Be concise (1-3 sentences).
- Quote numbers and dates exactly as they appear in the tool output.
Return strict JSON: { \"finalAnswer\": \"...\" }.";

/// Render the capability catalogue, one line per tool, in registration order.
pub fn render_catalogue(tools: &[ToolDescriptor]) -> String {
    tools
        .iter()
        .map(|t| format!("- {}: {}; schema={}", t.name, t.description, t.input_schema))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the planner prompt for one step.
pub fn render_planner(tools: &[ToolDescriptor], context: &str) -> String {
    format!(
        "{PLANNER_PREAMBLE}\n\nTools:\n{}\n\n{PLANNER_RULES}\n\n{PLANNER_SHAPES}\n\nUser: {context}\n",
        render_catalogue(tools)
    )
}

/// Render the synthesizer prompt. `tool_output` is capped at `cap_chars`.
pub fn render_synthesizer(
    user_message: &str,
    tool_name: &str,
    tool_output: &str,
    cap_chars: usize,
) -> String {
    format!(
        "{SYNTH_PREAMBLE}\n\nUser: {user_message}\nMost recent tool name: {tool_name}\nMost recent tool output (JSON): {}\n",
        truncate_chars(tool_output, cap_chars)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptors() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: "check_holiday".into(),
                description: "Check if a date (YYYY-MM-DD) is a holiday.".into(),
                input_schema: json!({"type": "object", "required": ["date_str"]}),
            },
            ToolDescriptor {
                name: "http_get".into(),
                description: "HTTP GET.".into(),
                input_schema: json!({"type": "object"}),
            },
        ]
    }

    #[test]
    fn catalogue_lines_follow_registration_order() {
        let catalogue = render_catalogue(&descriptors());
        let lines: Vec<_> = catalogue.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("- check_holiday: Check if a date"));
        assert!(lines[0].contains(r#"; schema={"#));
        assert!(lines[0].contains(r#""required":["date_str"]"#));
        assert!(lines[1].starts_with("- http_get:"));
    }

    #[test]
    fn planner_prompt_embeds_catalogue_and_context() {
        let prompt = render_planner(&descriptors(), "Is July 4 a holiday?");
        assert!(prompt.contains("Decide the NEXT best action. Output strict JSON only."));
        assert!(prompt.contains("- check_holiday:"));
        assert!(prompt.trim_end().ends_with("User: Is July 4 a holiday?"));
        assert_eq!(prompt, render_planner(&descriptors(), "Is July 4 a holiday?"));
    }

    #[test]
    fn synthesizer_prompt_caps_the_output() {
        let output = "é".repeat(100);
        let prompt = render_synthesizer("hi", "list_holidays", &output, 10);
        assert!(prompt.contains("Most recent tool name: list_holidays"));
        assert!(prompt.contains(&format!("Most recent tool output (JSON): {}\n", "é".repeat(10))));
        assert!(!prompt.contains(&"é".repeat(11)));
        assert!(prompt.contains("finalAnswer"));
    }
}
