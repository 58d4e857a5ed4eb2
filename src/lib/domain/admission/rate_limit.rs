//! Fixed-window send limiter

use std::{convert::Infallible, fmt, str::FromStr};

use chrono::{DateTime, Utc};

use super::AdmissionError;

/// Length of a rate-limit window in milliseconds
pub const WINDOW_MILLIS: i64 = 60_000;

/// The configured number of sends admitted per window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SendLimit {
    /// No limit is enforced
    #[default]
    Disabled,

    /// At most this many sends per window
    PerMinute(u32),
}

impl SendLimit {
    /// Create a limit from a signed count; zero or negative disables limiting
    pub fn new(limit: i64) -> Self {
        match u32::try_from(limit) {
            Ok(0) => Self::Disabled,
            Ok(limit) => Self::PerMinute(limit),
            Err(_) if limit > 0 => Self::PerMinute(u32::MAX),
            Err(_) => Self::Disabled,
        }
    }

    /// The limit, if one is enforced
    pub fn per_minute(&self) -> Option<u32> {
        match self {
            Self::Disabled => None,
            Self::PerMinute(limit) => Some(*limit),
        }
    }
}

/// Values that are not integers disable limiting rather than failing startup.
impl FromStr for SendLimit {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(raw
            .trim()
            .parse::<i64>()
            .map(Self::new)
            .unwrap_or(Self::Disabled))
    }
}

impl fmt::Display for SendLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::PerMinute(limit) => write!(f, "{limit}/minute"),
        }
    }
}

/// A single global tumbling window.
///
/// Rollover is lazy: the window only restarts when a send is attempted at least
/// [`WINDOW_MILLIS`] after it began.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateWindow {
    window_start: DateTime<Utc>,
    count: u32,
}

impl RateWindow {
    /// Create an empty window starting at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    /// Attempts to take one slot from the window.
    ///
    /// A disabled limit admits unconditionally and leaves the window untouched.
    pub fn admit(&mut self, limit: SendLimit, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        let Some(limit) = limit.per_minute() else {
            return Ok(());
        };

        if self.has_expired(now) {
            self.window_start = now;
            self.count = 0;
        }

        if self.count >= limit {
            return Err(AdmissionError::RateLimitExceeded { limit });
        }

        self.count += 1;

        Ok(())
    }

    /// Sends counted against the window that is current at `now`.
    ///
    /// Reading never rolls the window over.
    pub fn count_at(&self, now: DateTime<Utc>) -> u32 {
        if self.has_expired(now) {
            0
        } else {
            self.count
        }
    }

    /// When the current window began
    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    fn has_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.window_start).num_milliseconds() >= WINDOW_MILLIS
    }
}
