//! Mail transport port

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

mod errors;
mod message;

pub use errors::MailerError;
pub use message::{EmailBody, OutgoingEmail, SentEmail};

/// Mail transport
#[async_trait]
pub trait Mailer: Clone + Send + Sync + 'static {
    /// Submit a message
    ///
    /// # Arguments
    /// * `email` - The [`OutgoingEmail`] to submit. The sender is supplied by the transport.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing a [`SentEmail`] receipt if the
    /// message was accepted, or an [`Err`] containing a [`MailerError`] otherwise.
    async fn send_email(&self, email: &OutgoingEmail) -> Result<SentEmail, MailerError>;

    /// Check that the transport can reach and authenticate with its server
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] if the server is reachable, or an [`Err`]
    /// containing [`MailerError::Connectivity`] otherwise.
    async fn verify_connection(&self) -> Result<(), MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Clone for Mailer {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Mailer for Mailer {
        async fn send_email(&self, email: &OutgoingEmail) -> Result<SentEmail, MailerError>;
        async fn verify_connection(&self) -> Result<(), MailerError>;
    }
}
