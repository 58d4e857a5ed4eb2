//! Email service: the send pipeline and the health report

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn, Span};

#[cfg(test)]
use mockall::mock;

use crate::domain::{
    admission::AllowList,
    communication::{
        errors::SendEmailError,
        mailer::{Mailer, OutgoingEmail},
        outcome::LastSendOutcome,
        requests::SendEmailRequest,
    },
    health::{Connectivity, HealthReport},
    state::GatewayState,
};

/// Confirmation of an accepted send
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendReceipt {
    /// Number of recipients across `to`, `cc` and `bcc`
    pub recipients: usize,

    /// The `Message-ID` assigned by the transport
    pub message_id: Option<String>,
}

/// Email service
#[async_trait]
pub trait EmailService: Clone + Send + Sync + 'static {
    /// Sends a validated request through normalization, admission control and
    /// the transport.
    ///
    /// # Arguments
    /// * `request` - A [`SendEmailRequest`] that already passed shape validation.
    ///
    /// # Returns
    /// A [`Result`] which is [`Ok`] containing a [`SendReceipt`] if the transport
    /// accepted the message, or an [`Err`] containing the first
    /// [`SendEmailError`] raised by the pipeline.
    async fn send_email(&self, request: SendEmailRequest) -> Result<SendReceipt, SendEmailError>;

    /// Gathers transport connectivity, limiter occupancy, allow-list status and
    /// the last send outcome. Never fails.
    async fn health_report(&self) -> HealthReport;
}

#[cfg(test)]
mock! {
    pub EmailService {}

    impl Clone for EmailService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl EmailService for EmailService {
        async fn send_email(&self, request: SendEmailRequest) -> Result<SendReceipt, SendEmailError>;
        async fn health_report(&self) -> HealthReport;
    }
}

/// Email service implementation
#[derive(Debug, Clone)]
pub struct EmailServiceImpl<M>
where
    M: Mailer,
{
    mailer: Arc<M>,
    allow_list: Arc<AllowList>,
    state: Arc<GatewayState>,
}

impl<M> EmailServiceImpl<M>
where
    M: Mailer,
{
    /// Creates a new email service.
    pub fn new(mailer: Arc<M>, allow_list: AllowList, state: Arc<GatewayState>) -> Self {
        Self {
            mailer,
            allow_list: Arc::new(allow_list),
            state,
        }
    }

    /// Runs the send pipeline, admitting against the rate window as of `now`
    #[instrument(skip_all, fields(recipients))]
    pub(crate) async fn send_email_at(
        &self,
        request: SendEmailRequest,
        now: DateTime<Utc>,
    ) -> Result<SendReceipt, SendEmailError> {
        let request = request.normalize()?;

        let recipients = request.recipient_count();
        Span::current().record("recipients", recipients);

        if let Err(err) = self.allow_list.enforce(request.recipients()) {
            warn!("{err}");
            return Err(err.into());
        }

        if let Err(err) = self.state.admit_at(now).await {
            warn!("{err}");
            return Err(err.into());
        }

        let email = OutgoingEmail::from(request);

        match self.mailer.send_email(&email).await {
            Ok(sent) => {
                info!(message_id = ?sent.message_id, "email sent");

                self.state
                    .record(LastSendOutcome::success(sent.message_id.clone()))
                    .await;

                Ok(SendReceipt {
                    recipients,
                    message_id: sent.message_id,
                })
            }
            Err(err) => {
                let message = err.to_string();

                error!("failed to send email: {message}");

                self.state
                    .record(LastSendOutcome::error(message.clone()))
                    .await;

                Err(SendEmailError::SendFailed(message))
            }
        }
    }
}

#[async_trait]
impl<M> EmailService for EmailServiceImpl<M>
where
    M: Mailer,
{
    async fn send_email(&self, request: SendEmailRequest) -> Result<SendReceipt, SendEmailError> {
        self.send_email_at(request, Utc::now()).await
    }

    async fn health_report(&self) -> HealthReport {
        let smtp = match self.mailer.verify_connection().await {
            Ok(()) => Connectivity::Ok,
            Err(err) => {
                warn!("SMTP connectivity check failed: {err}");
                Connectivity::Error(err.to_string())
            }
        };

        HealthReport {
            smtp,
            rate_limit: self.state.occupancy().await,
            allow_list_entries: self.allow_list.len(),
            last_send: self.state.last_outcome().await,
        }
    }
}
