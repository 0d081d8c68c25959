use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Timestamp pattern used by activation log lines: UTC with millisecond
/// precision, e.g. `2024-05-01T12:30:45.123Z`.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Outcome of one blocking invocation against the action backend.
///
/// The backend answers 200 with the completed activation record, 202 with an
/// activation id when its own timeout elapsed first, and anything else is a
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    Success { record: JsonValue },
    Pending { activation_id: String },
    Failure { cause: FailureCause },
}

/// Why an invocation failed; `status` is absent for transport errors.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureCause {
    pub status: Option<u16>,
    pub message: String,
}

impl FailureCause {
    pub fn transport(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into() }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self { status: Some(status), message: message.into() }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Persisted record of one trigger fire. Written exactly once, never
/// mutated; `logs` holds one formatted line per fan-out rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerActivation {
    pub namespace: String,
    #[serde(rename = "entityName")]
    pub entity_name: String,
    pub subject: String,
    #[serde(rename = "activationId")]
    pub activation_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub response: JsonValue,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub logs: Vec<String>,
}

/// Severity tag embedded in activation log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(tag)
    }
}

/// Format one activation log line:
/// `[<timestamp>] [<LEVEL>] [<trigger>] [<rule>] [<action>] <message>`
pub fn format_log_line(
    timestamp: DateTime<Utc>,
    level: LogLevel,
    trigger: &str,
    rule: &str,
    action: &str,
    message: &str,
) -> String {
    format!(
        "[{}] [{}] [{}] [{}] [{}] {}",
        timestamp.format(LOG_TIMESTAMP_FORMAT),
        level,
        trigger,
        rule,
        action,
        message
    )
}
