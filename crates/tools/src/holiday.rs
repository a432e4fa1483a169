//! Holiday calendar tools.
//!
//! The company calendar is a set of fixed month/day holidays, the same
//! every year. Dates are ISO `YYYY-MM-DD`.

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use policybot_core::error::ToolError;
use policybot_core::observation::{Args, Payload};
use policybot_core::tool::Tool;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::args::{into_payload, optional_i64, optional_str, required_str};

const INVALID_DATE: &str = "Invalid date format. Use ISO 'YYYY-MM-DD'.";

/// A fixed-date company holiday calendar.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    /// (month, day) → name, ordered chronologically
    fixed: BTreeMap<(u32, u32), String>,
}

/// One dated holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

/// The answer to "is this date a holiday?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayCheck {
    pub is_holiday: bool,
    pub name: Option<String>,
    pub date: NaiveDate,
}

impl HolidayCalendar {
    /// The built-in company calendar.
    pub fn company_default() -> Self {
        let fixed = [
            ((1, 1), "New Year's Day"),
            ((1, 15), "Founders Day"),
            ((7, 4), "Independence Day"),
            ((9, 1), "Company Day"),
            ((11, 28), "Thanksgiving Day"),
            ((12, 25), "Christmas Day"),
        ]
        .into_iter()
        .map(|(md, name)| (md, name.to_string()))
        .collect();
        Self { fixed }
    }

    /// Build a calendar from `"MM-DD" → name` entries.
    ///
    /// An empty map yields the built-in calendar. Keys that are not valid
    /// `MM-DD` are skipped.
    pub fn from_month_days(entries: &BTreeMap<String, String>) -> Self {
        if entries.is_empty() {
            return Self::company_default();
        }

        let mut fixed = BTreeMap::new();
        for (key, name) in entries {
            match parse_month_day(key) {
                Some(md) => {
                    fixed.insert(md, name.clone());
                }
                None => tracing::warn!(key = %key, "Skipping holiday with invalid MM-DD key"),
            }
        }
        Self { fixed }
    }

    /// Whether `date` is a company holiday.
    pub fn check(&self, date: NaiveDate) -> HolidayCheck {
        let name = self.fixed.get(&(date.month(), date.day())).cloned();
        HolidayCheck {
            is_holiday: name.is_some(),
            name,
            date,
        }
    }

    /// All holidays in `year`, chronologically.
    pub fn list(&self, year: i32) -> Vec<Holiday> {
        self.fixed
            .iter()
            .filter_map(|(&(m, d), name)| {
                // Feb 29 only exists in leap years
                NaiveDate::from_ymd_opt(year, m, d).map(|date| Holiday {
                    date,
                    name: name.clone(),
                })
            })
            .collect()
    }

    /// The next `n` holidays on or after `start`, looking into the following year.
    pub fn next(&self, n: usize, start: NaiveDate) -> Vec<Holiday> {
        let year = start.year();
        self.list(year)
            .into_iter()
            .chain(self.list(year + 1))
            .filter(|h| h.date >= start)
            .take(n)
            .collect()
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::company_default()
    }
}

fn parse_month_day(key: &str) -> Option<(u32, u32)> {
    let (m, d) = key.split_once('-')?;
    let (m, d) = (m.parse().ok()?, d.parse().ok()?);
    // 2024 is a leap year, so Feb 29 is accepted
    NaiveDate::from_ymd_opt(2024, m, d).map(|_| (m, d))
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ToolError::InvalidArguments(INVALID_DATE.into()))
}

// ── Tools ────────────────────────────────────────────────────────────────

/// `check_holiday {date_str}` → `{is_holiday, name, date}`.
pub struct CheckHolidayTool {
    calendar: Arc<HolidayCalendar>,
}

impl CheckHolidayTool {
    pub fn new(calendar: Arc<HolidayCalendar>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for CheckHolidayTool {
    fn name(&self) -> &str {
        "check_holiday"
    }

    fn description(&self) -> &str {
        "Check if a date (YYYY-MM-DD) is a holiday."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "date_str": { "type": "string", "description": "ISO date YYYY-MM-DD" }
            },
            "required": ["date_str"]
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let date = parse_iso_date(required_str(args, "date_str")?)?;
        into_payload(self.name(), &self.calendar.check(date))
    }
}

#[derive(Serialize)]
struct HolidayList {
    holidays: Vec<Holiday>,
    count: usize,
}

impl From<Vec<Holiday>> for HolidayList {
    fn from(holidays: Vec<Holiday>) -> Self {
        Self {
            count: holidays.len(),
            holidays,
        }
    }
}

/// `list_holidays {year?}` → `{holidays, count}`.
pub struct ListHolidaysTool {
    calendar: Arc<HolidayCalendar>,
}

impl ListHolidaysTool {
    pub fn new(calendar: Arc<HolidayCalendar>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for ListHolidaysTool {
    fn name(&self) -> &str {
        "list_holidays"
    }

    fn description(&self) -> &str {
        "List all company holidays for a year (defaults to the current year)."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "year": { "type": "integer", "description": "Four-digit year" }
            },
            "required": []
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let year = match optional_i64(args, "year")? {
            Some(y) => i32::try_from(y)
                .map_err(|_| ToolError::InvalidArguments("'year' is out of range".into()))?,
            None => Local::now().year(),
        };
        into_payload(self.name(), &HolidayList::from(self.calendar.list(year)))
    }
}

/// `next_holidays {n?, start_date?}` → `{holidays, count}`.
pub struct NextHolidaysTool {
    calendar: Arc<HolidayCalendar>,
}

impl NextHolidaysTool {
    pub fn new(calendar: Arc<HolidayCalendar>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for NextHolidaysTool {
    fn name(&self) -> &str {
        "next_holidays"
    }

    fn description(&self) -> &str {
        "List the next N company holidays on or after a start date (defaults: n=5, today)."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "n": { "type": "integer", "description": "How many holidays to return (default 5)" },
                "start_date": { "type": "string", "description": "ISO date YYYY-MM-DD" }
            },
            "required": []
        })
    }

    async fn invoke(&self, args: &Args) -> Result<Payload, ToolError> {
        let n = optional_i64(args, "n")?.unwrap_or(5).max(0) as usize;
        let start = match optional_str(args, "start_date")? {
            Some(s) => parse_iso_date(s)?,
            None => Local::now().date_naive(),
        };
        into_payload(self.name(), &HolidayList::from(self.calendar.next(n, start)))
    }
}
