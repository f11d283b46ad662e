//! Session-scoped logging handler: RFC 5424 severity filter and
//! `logging/setLevel` (spec.md §4.7).

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// RFC 5424 severities. Lower number = higher severity; `Emergency` is the
/// most severe, `Debug` the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    #[must_use]
    pub fn priority(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "emergency" => Some(Self::Emergency),
            "alert" => Some(Self::Alert),
            "critical" => Some(Self::Critical),
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "notice" => Some(Self::Notice),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

/// A `notifications/message` payload.
#[derive(Debug, Clone, Serialize)]
pub struct LogNotification {
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Tracks one session's minimum emitted log level.
pub struct LoggingHandler {
    minimum: AtomicU8,
}

impl LoggingHandler {
    #[must_use]
    pub fn new() -> Self {
        // Default per the MCP spec family: emit everything up to `info`.
        Self { minimum: AtomicU8::new(LogLevel::Info.priority()) }
    }

    #[must_use]
    pub fn minimum_level(&self) -> LogLevel {
        match self.minimum.load(Ordering::Acquire) {
            0 => LogLevel::Emergency,
            1 => LogLevel::Alert,
            2 => LogLevel::Critical,
            3 => LogLevel::Error,
            4 => LogLevel::Warning,
            5 => LogLevel::Notice,
            6 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    /// `logging/setLevel{level}`. Returns `Err` for an unrecognized level
    /// name (maps to invalid-params at the router).
    pub fn set_level(&self, level: &str) -> Result<(), String> {
        let Some(level) = LogLevel::from_str_opt(level) else {
            return Err(format!("unknown log level: {level}"));
        };
        self.minimum.store(level.priority(), Ordering::Release);
        Ok(())
    }

    /// `true` iff a message at `level` should be emitted given the current
    /// threshold: lower numeric priority is more severe, so emit iff
    /// `priority(level) <= priority(minimum)`.
    #[must_use]
    pub fn should_emit(&self, level: LogLevel) -> bool {
        level.priority() <= self.minimum_level().priority()
    }

    /// Build the notification iff it should be emitted under the current
    /// threshold.
    #[must_use]
    pub fn notify(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        logger: Option<String>,
        data: Option<serde_json::Value>,
    ) -> Option<LogNotification> {
        self.should_emit(level).then(|| LogNotification { level, message: message.into(), logger, data })
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new()
    }
}
