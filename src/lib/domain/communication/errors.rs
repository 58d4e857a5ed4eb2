//! Error types for the send pipeline

use thiserror::Error;
use tracing::debug;

use crate::domain::{
    admission::AdmissionError,
    communication::{recipients::HeaderInjectionError, requests::ValidationError},
};

/// Errors that stop a send request
#[derive(Debug, Error)]
pub enum SendEmailError {
    /// The raw arguments were malformed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A header-bound field contained a line break
    #[error(transparent)]
    HeaderInjection(#[from] HeaderInjectionError),

    /// No usable address remained in `to` after normalization
    #[error("At least one recipient is required in \"to\"")]
    EmptyRecipient,

    /// Recipients outside the allow list
    #[error("Recipients not permitted by the allow list: {}", .0.join(", "))]
    RecipientsNotAllowed(Vec<String>),

    /// The send quota for the current window is used up
    #[error("Rate limit exceeded: at most {limit} emails per minute")]
    RateLimitExceeded {
        /// The configured per-window limit
        limit: u32,
    },

    /// The transport failed to deliver the message
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

impl From<AdmissionError> for SendEmailError {
    fn from(err: AdmissionError) -> Self {
        debug!("AdmissionError -> SendEmailError");

        match err {
            AdmissionError::RecipientsNotAllowed(recipients) => {
                SendEmailError::RecipientsNotAllowed(recipients)
            }
            AdmissionError::RateLimitExceeded { limit } => {
                SendEmailError::RateLimitExceeded { limit }
            }
        }
    }
}
