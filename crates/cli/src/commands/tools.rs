//! `policybot tools` — show the planner's tool catalogue.

use policybot_agent::prompts::render_catalogue;
use policybot_config::AppConfig;

pub async fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = policybot_tools::default_registry(&config.tools)?;
    let descriptors = registry.describe_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
    } else {
        println!("{} tools registered:\n", descriptors.len());
        println!("{}", render_catalogue(&descriptors));
    }

    Ok(())
}
