//! Admission errors

use thiserror::Error;

/// Reasons a normalized request is refused before it reaches the transport
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// One or more recipients are outside the configured allow list
    #[error("Recipients not permitted by the allow list: {}", .0.join(", "))]
    RecipientsNotAllowed(Vec<String>),

    /// The send quota for the current window is used up
    #[error("Rate limit exceeded: at most {limit} emails per minute")]
    RateLimitExceeded {
        /// The configured per-window limit
        limit: u32,
    },
}
