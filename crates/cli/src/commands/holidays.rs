//! `policybot holidays` — list company holidays.

use std::sync::Arc;

use policybot_config::AppConfig;
use policybot_core::observation::{Args, Payload};
use policybot_core::tool::Tool;
use policybot_tools::HolidayCalendar;
use policybot_tools::holiday::{ListHolidaysTool, NextHolidaysTool};

pub async fn run(year: Option<i32>, next: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let calendar = Arc::new(HolidayCalendar::from_month_days(&config.tools.holidays));

    let mut args = Args::new();
    let payload = match next {
        Some(n) => {
            args.insert("n".into(), n.into());
            NextHolidaysTool::new(calendar).invoke(&args).await?
        }
        None => {
            if let Some(year) = year {
                args.insert("year".into(), year.into());
            }
            ListHolidaysTool::new(calendar).invoke(&args).await?
        }
    };

    print!("{}", render_holidays(&payload));
    Ok(())
}

fn render_holidays(payload: &Payload) -> String {
    let Some(holidays) = payload.get("holidays").and_then(|h| h.as_array()) else {
        return "No holidays.\n".into();
    };
    if holidays.is_empty() {
        return "No holidays.\n".into();
    }

    holidays
        .iter()
        .map(|h| {
            format!(
                "  {}  {}\n",
                h["date"].as_str().unwrap_or("?"),
                h["name"].as_str().unwrap_or("?")
            )
        })
        .collect()
}
