//! Process-wide gateway state

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{
    admission::{AdmissionError, RateWindow, SendLimit},
    communication::LastSendOutcome,
};

/// Rate-limiter occupancy for the current window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupancy {
    /// Sends admitted in the current window
    pub count: u32,

    /// The configured per-window limit
    pub limit: u32,
}

#[derive(Debug)]
struct Inner {
    window: RateWindow,
    last_outcome: Option<LastSendOutcome>,
}

/// Holds the rate window and the last send outcome behind a single lock.
///
/// Callers only get the narrow operations below; the fields are never exposed.
#[derive(Debug)]
pub struct GatewayState {
    limit: SendLimit,
    inner: Mutex<Inner>,
}

impl GatewayState {
    /// Create fresh state with an empty window and no recorded attempts
    pub fn new(limit: SendLimit) -> Self {
        Self {
            limit,
            inner: Mutex::new(Inner {
                window: RateWindow::new(Utc::now()),
                last_outcome: None,
            }),
        }
    }

    /// The configured send limit
    pub fn limit(&self) -> SendLimit {
        self.limit
    }

    /// Takes one send slot from the current window
    pub async fn admit(&self) -> Result<(), AdmissionError> {
        self.admit_at(Utc::now()).await
    }

    pub(crate) async fn admit_at(&self, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        self.inner.lock().await.window.admit(self.limit, now)
    }

    /// Replaces the remembered outcome
    pub async fn record(&self, outcome: LastSendOutcome) {
        self.inner.lock().await.last_outcome = Some(outcome);
    }

    /// The most recent send outcome, if any attempt has been made
    pub async fn last_outcome(&self) -> Option<LastSendOutcome> {
        self.inner.lock().await.last_outcome.clone()
    }

    /// Current occupancy, or [`None`] when limiting is disabled
    pub async fn occupancy(&self) -> Option<Occupancy> {
        self.occupancy_at(Utc::now()).await
    }

    pub(crate) async fn occupancy_at(&self, now: DateTime<Utc>) -> Option<Occupancy> {
        let limit = self.limit.per_minute()?;
        let count = self.inner.lock().await.window.count_at(now);

        Some(Occupancy { count, limit })
    }
}
