//! Diagnostics report

use std::fmt;

use crate::domain::{communication::LastSendOutcome, state::Occupancy};

/// Result of the transport connectivity probe
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Connectivity {
    /// The server answered and accepted the login
    Ok,

    /// The probe failed
    Error(String),
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// A point-in-time view of the gateway, rendered as plain text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealthReport {
    /// SMTP connectivity
    pub smtp: Connectivity,

    /// Rate-limiter occupancy, [`None`] when limiting is disabled
    pub rate_limit: Option<Occupancy>,

    /// Number of allow-list entries, zero when the guard is disabled
    pub allow_list_entries: usize,

    /// The most recent send attempt
    pub last_send: Option<LastSendOutcome>,
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SMTP connection: {}", self.smtp)?;

        match self.rate_limit {
            Some(Occupancy { count, limit }) => {
                writeln!(f, "Rate limit: {count}/{limit} in current minute window")?
            }
            None => writeln!(f, "Rate limit: disabled")?,
        }

        match self.allow_list_entries {
            0 => writeln!(f, "Allow list: disabled")?,
            entries => writeln!(f, "Allow list: enabled ({entries} entries)")?,
        }

        match &self.last_send {
            Some(outcome) => write!(f, "Last send: {outcome}"),
            None => write!(f, "Last send: no attempts yet"),
        }
    }
}
