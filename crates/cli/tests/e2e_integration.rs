//! End-to-end tests: the full loop over the real built-in tools, with a
//! scripted oracle standing in for the language model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use policybot_agent::{AgentLoop, StopReason};
use policybot_config::{AgentConfig, ToolsConfig};
use policybot_core::error::OracleError;
use policybot_core::oracle::Oracle;
use policybot_core::trace::TraceEntry;
use policybot_tools::{LeaveStore, default_registry, registry_with_store};

// ── Scripted Oracle ──────────────────────────────────────────────────────

struct ScriptedOracle {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "e2e_scripted"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(OracleError::EmptyResponse)
    }
}

fn agent(responses: &[&str]) -> (AgentLoop, Arc<ScriptedOracle>) {
    let oracle = Arc::new(ScriptedOracle::new(responses));
    let tools = Arc::new(default_registry(&ToolsConfig::default()).unwrap());
    (AgentLoop::new(oracle.clone(), tools), oracle)
}

fn observation_at(result: &policybot_agent::AgentResult, index: usize) -> serde_json::Value {
    match &result.trace.entries()[index] {
        TraceEntry::Observed { observation, .. } => observation.to_value(),
        other => panic!("entry {index} is not an observation: {other:?}"),
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn holiday_question_uses_the_real_calendar() {
    let (agent, oracle) = agent(&[
        r#"{"action":"tool","name":"check_holiday","args":{"date_str":"2025-07-04"}}"#,
        r#"{"action":"final","answer":"Yes, July 4 is a holiday."}"#,
    ]);

    let result = agent.run("Is July 4th 2025 a holiday?").await;
    assert_eq!(result.answer, "Yes, July 4 is a holiday.");
    assert_eq!(result.steps_taken, 2);
    assert_eq!(
        observation_at(&result, 2),
        serde_json::json!({"is_holiday": true, "name": "Independence Day", "date": "2025-07-04"})
    );

    let prompts = oracle.prompts();
    for name in ["check_holiday", "create_leave_request", "http_get", "http_post"] {
        assert!(prompts[0].contains(&format!("- {name}:")), "catalogue missing {name}");
    }
    assert!(prompts[1].contains("(Previous result: {"));
}

#[tokio::test]
async fn bad_arguments_are_observed_and_the_planner_recovers() {
    let (agent, _) = agent(&[
        r#"{"action":"tool","name":"check_holiday","args":{"date_str":"July 4"}}"#,
        r#"{"action":"tool","name":"check_holiday","args":{"date_str":"2025-07-04"}}"#,
        r#"{"action":"final","answer":"It is Independence Day."}"#,
    ]);

    let result = agent.run("july 4 holiday?").await;
    assert_eq!(result.steps_taken, 3);
    assert_eq!(
        observation_at(&result, 2),
        serde_json::json!({"error": "Invalid date format. Use ISO 'YYYY-MM-DD'."})
    );
    assert_eq!(observation_at(&result, 5)["is_holiday"], true);
}

#[tokio::test]
async fn leave_requests_persist_across_sessions() {
    let store = Arc::new(LeaveStore::new());
    let tools = Arc::new(registry_with_store(&ToolsConfig::default(), store.clone()).unwrap());

    let create = AgentLoop::new(
        Arc::new(ScriptedOracle::new(&[
            r#"{"action":"tool","name":"create_leave_request","args":{"user":"alice","start_date":"2025-08-04","end_date":"2025-08-08","reason":"vacation"}}"#,
            r#"{"action":"final","answer":"Your request was submitted."}"#,
        ])),
        tools.clone(),
    );
    let created = create.run("Book me Aug 4-8 off for vacation, I'm alice").await;
    assert_eq!(created.answer, "Your request was submitted.");
    let id = observation_at(&created, 2)["created"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let approve_call = format!(
        r#"{{"action":"tool","name":"approve_leave_request","args":{{"id":"{id}"}}}}"#
    );
    let approve = AgentLoop::new(
        Arc::new(ScriptedOracle::new(&[
            approve_call.as_str(),
            r#"{"action":"list","what":"everything"}"#,
        ])),
        tools.clone(),
    );
    let approved = approve.run(&format!("approve {id}")).await;
    assert_eq!(approved.stop_reason, StopReason::Fatal);
    let obs = observation_at(&approved, 2);
    assert_eq!(obs["ok"], true);
    assert_eq!(obs["previous_status"], "submitted");

    let list = AgentLoop::new(
        Arc::new(ScriptedOracle::new(&[
            r#"{"action":"tool","name":"list_leave_requests","args":{"user":"alice's","status":"approved"}}"#,
        ])),
        tools,
    );
    let listed = list.run_with_budget("show alice's approved leave", 1).await;
    assert_eq!(listed.stop_reason, StopReason::Synthesized);
    assert_eq!(observation_at(&listed, 2)["count"], 1);
    // Oracle has nothing left for synthesis, so the echo fallback answers
    assert!(listed.answer.starts_with("Here is what I found: "));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn disallowed_url_is_denied_without_leaving_the_loop() {
    let (agent, _) = agent(&[
        r#"{"action":"tool","name":"http_get","args":{"url":"https://example.com/admin"}}"#,
        r#"{"action":"final","answer":"I can't call that endpoint."}"#,
    ]);

    let result = agent.run("GET https://example.com/admin").await;
    assert_eq!(result.answer, "I can't call that endpoint.");
    assert_eq!(
        observation_at(&result, 2),
        serde_json::json!({"error": "URL not allowed"})
    );
}

#[tokio::test]
async fn unknown_tool_ends_the_run() {
    let (agent, _) = agent(&[r#"{"action":"tool","name":"doc_search","args":{"query":"PTO"}}"#]);

    let result = agent.run("How many PTO days?").await;
    assert_eq!(result.answer, "Unknown tool 'doc_search'.");
    assert_eq!(result.steps_taken, 1);
    assert_eq!(result.trace.len(), 3);
}

#[tokio::test]
async fn budget_exhaustion_synthesizes_from_the_last_tool() {
    let oracle = Arc::new(ScriptedOracle::new(&[
        r#"{"action":"tool","name":"next_holidays","args":{"n":2,"start_date":"2025-11-01"}}"#,
        r#"{"action":"tool","name":"list_holidays","args":{"year":2026}}"#,
        r#"{"finalAnswer":"There are 6 holidays in 2026."}"#,
    ]));
    let tools = Arc::new(default_registry(&ToolsConfig::default()).unwrap());
    let config = AgentConfig {
        max_steps: 2,
        ..AgentConfig::default()
    };
    let agent = AgentLoop::from_config(oracle.clone(), tools, &config);

    let result = agent.run("How many holidays next year?").await;
    assert_eq!(result.answer, "There are 6 holidays in 2026.");
    assert_eq!(result.steps_taken, 2);
    assert_eq!(
        result.trace.last(),
        Some(&TraceEntry::SynthesisRecorded {
            from_tool: "list_holidays".into()
        })
    );

    let synth_prompt = oracle.prompts().pop().unwrap();
    assert!(synth_prompt.contains("User: How many holidays next year?"));
    assert!(synth_prompt.contains("Most recent tool name: list_holidays"));
}

#[tokio::test]
async fn result_json_has_the_documented_shape() {
    let (agent, _) = agent(&[r#"{"action":"final","answer":"PTO is 15 days."}"#]);
    let value = serde_json::to_value(agent.run("PTO?").await).unwrap();

    assert_eq!(value["type"], "final");
    assert_eq!(value["answer"], "PTO is 15 days.");
    assert_eq!(value["steps"], 1);
    assert_eq!(value["trace"][0]["kind"], "plan_recorded");
    assert_eq!(value["trace"][0]["plan"]["action"], "final");
}
