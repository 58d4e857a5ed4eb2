//! Outcome of the most recent send attempt

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// The result of a single send attempt, as remembered for diagnostics
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LastSendOutcome {
    /// The transport accepted the message
    Success {
        /// When the attempt finished
        timestamp: DateTime<Utc>,

        /// Transport-supplied detail, usually the message identifier
        detail: Option<String>,
    },

    /// The transport rejected the message or could not be reached
    Error {
        /// When the attempt finished
        timestamp: DateTime<Utc>,

        /// Description of the failure
        message: String,
    },
}

impl LastSendOutcome {
    /// A successful attempt finishing now
    pub fn success(detail: Option<String>) -> Self {
        Self::Success {
            timestamp: Utc::now(),
            detail,
        }
    }

    /// A failed attempt finishing now
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }

    /// When the attempt finished
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Success { timestamp, .. } | Self::Error { timestamp, .. } => *timestamp,
        }
    }
}

impl fmt::Display for LastSendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp = self
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        match self {
            Self::Success {
                detail: Some(detail),
                ..
            } => write!(f, "success at {timestamp} ({detail})"),
            Self::Success { detail: None, .. } => write!(f, "success at {timestamp}"),
            Self::Error { message, .. } => write!(f, "error at {timestamp}: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_success_display_includes_detail() {
        let outcome = LastSendOutcome::Success {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            detail: Some("<abc@example.com>".to_string()),
        };

        assert_eq!(
            outcome.to_string(),
            "success at 2024-05-01T12:30:00.000Z (<abc@example.com>)"
        );
    }

    #[test]
    fn test_success_display_without_detail() {
        let outcome = LastSendOutcome::Success {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            detail: None,
        };

        assert_eq!(outcome.to_string(), "success at 2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn test_error_display_includes_message() {
        let outcome = LastSendOutcome::Error {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            message: "connection refused".to_string(),
        };

        assert_eq!(
            outcome.to_string(),
            "error at 2024-05-01T12:30:00.000Z: connection refused"
        );
    }
}
