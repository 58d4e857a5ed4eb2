//! Mailer errors

use thiserror::Error;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// An address could not be parsed into a mailbox
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled
    #[error("Could not build message: {0}")]
    InvalidMessage(String),

    /// The server refused the message or the connection failed mid-send
    #[error("{0}")]
    Transport(String),

    /// The server could not be reached or refused the login
    #[error("{0}")]
    Connectivity(String),
}
