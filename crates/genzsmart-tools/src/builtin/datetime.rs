// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `get_datetime` tool.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use genzsmart_core::GenzsmartError;
use serde_json::{Value, json};
use strum::{Display, EnumString};
use tracing::debug;

use crate::tool::{Tool, ToolDefinition, ToolOutcome, ToolParameter, ToolType};

pub const NAME: &str = "get_datetime";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
enum Format {
    Full,
    Date,
    Time,
    Iso,
    Timestamp,
}

type NowFn = dyn Fn() -> DateTime<Utc> + Send + Sync;

pub struct DateTimeTool {
    definition: ToolDefinition,
    now: Box<NowFn>,
}

impl DateTimeTool {
    pub fn new() -> Self {
        Self::with_now(Utc::now)
    }

    /// Uses `now` instead of the system clock.
    pub fn with_now(now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Get current date and time information".to_string(),
                parameters: vec![
                    ToolParameter::optional("format", "string", "Output format", json!("full"))
                        .with_enum(&["full", "date", "time", "iso", "timestamp"]),
                    ToolParameter::optional(
                        "timezone",
                        "string",
                        "Timezone (e.g., 'UTC', 'America/New_York')",
                        json!("UTC"),
                    ),
                ],
                tool_type: ToolType::Datetime,
            },
            now: Box::new(now),
        }
    }
}

impl Default for DateTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

fn render(format: Format, now: DateTime<Utc>, timezone: &str) -> Value {
    match Tz::from_str(timezone) {
        Ok(tz) => {
            let local = now.with_timezone(&tz);
            match format {
                Format::Full => json!(local.format("%Y-%m-%d %H:%M:%S %Z").to_string()),
                Format::Date => json!(local.format("%Y-%m-%d").to_string()),
                Format::Time => json!(local.format("%H:%M:%S").to_string()),
                Format::Iso => json!(local.to_rfc3339()),
                Format::Timestamp => json!(local.timestamp()),
            }
        }
        // Unknown zone: local wall-clock time without zone information.
        Err(_) => {
            debug!(timezone, "unknown timezone, falling back to local time");
            let naive = now.with_timezone(&Local).naive_local();
            match format {
                Format::Full => json!(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
                Format::Date => json!(naive.format("%Y-%m-%d").to_string()),
                Format::Time => json!(naive.format("%H:%M:%S").to_string()),
                Format::Iso => json!(naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
                Format::Timestamp => json!(now.timestamp()),
            }
        }
    }
}

#[async_trait]
impl Tool for DateTimeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutcome, GenzsmartError> {
        let format_name = args["format"].as_str().unwrap_or("full");
        let timezone = args["timezone"].as_str().unwrap_or("UTC");
        // Unrecognized formats render like `full`.
        let format = Format::from_str(format_name).unwrap_or(Format::Full);

        Ok(ToolOutcome::ok(json!({
            "datetime": render(format, (self.now)(), timezone),
            "format": format_name,
            "timezone": timezone,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTimeTool {
        DateTimeTool::with_now(|| Utc.with_ymd_and_hms(2026, 1, 15, 17, 30, 5).unwrap())
    }

    async fn datetime(args: Value) -> Value {
        let outcome = fixed().invoke(args).await.unwrap();
        assert!(outcome.success);
        outcome.get("datetime").cloned().unwrap()
    }

    #[tokio::test]
    async fn formats_in_named_timezone() {
        assert_eq!(datetime(json!({})).await, json!("2026-01-15 17:30:05 UTC"));
        assert_eq!(
            datetime(json!({"timezone": "America/New_York"})).await,
            json!("2026-01-15 12:30:05 EST")
        );
        assert_eq!(
            datetime(json!({"format": "date", "timezone": "Asia/Tokyo"})).await,
            json!("2026-01-16")
        );
        assert_eq!(datetime(json!({"format": "time"})).await, json!("17:30:05"));
        assert_eq!(
            datetime(json!({"format": "iso", "timezone": "Europe/Paris"})).await,
            json!("2026-01-15T18:30:05+01:00")
        );
        assert_eq!(datetime(json!({"format": "timestamp"})).await, json!(1_768_498_205));
    }

    #[tokio::test]
    async fn unknown_timezone_falls_back_to_local() {
        let outcome = fixed()
            .invoke(json!({"format": "full", "timezone": "Mars/Olympus"}))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.get("timezone"), Some(&json!("Mars/Olympus")));
        let rendered = outcome.get("datetime").and_then(Value::as_str).unwrap();
        let pattern = regex::Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
        assert!(pattern.is_match(rendered), "{rendered}");

        let ts = datetime(json!({"format": "timestamp", "timezone": "Nowhere"})).await;
        assert_eq!(ts, json!(1_768_498_205));
    }
}
