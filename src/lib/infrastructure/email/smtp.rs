//! SMTP mailer implementation

use std::{convert::Infallible, fmt, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{builder::BoolishValueParser, ArgAction, Parser};
use lettre::{
    message::{
        header::{Bcc, Cc, ContentType, To},
        Mailbox, Mailboxes,
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters, TlsVersion},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::communication::mailer::{
    EmailBody, Mailer, MailerError, OutgoingEmail, SentEmail,
};

/// Minimum TLS protocol version accepted from the server
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlsMinVersion {
    /// `TLSv1`
    Tls10,

    /// `TLSv1.1`
    Tls11,

    /// `TLSv1.2`
    Tls12,

    /// `TLSv1.3`
    Tls13,
}

/// Unrecognized names fall back to `TLSv1.1`.
impl FromStr for TlsMinVersion {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.trim() {
            "TLSv1" => Self::Tls10,
            "TLSv1.2" => Self::Tls12,
            "TLSv1.3" => Self::Tls13,
            _ => Self::Tls11,
        })
    }
}

impl TlsMinVersion {
    /// The minimum the native-tls backend will accept; it has no `TLSv1.3` floor.
    fn native_floor(self) -> TlsVersion {
        match self {
            Self::Tls13 => {
                warn!("native TLS cannot require TLSv1.3, using TLSv1.2 as the minimum");
                TlsVersion::Tlsv12
            }
            version => version.into(),
        }
    }
}

impl From<TlsMinVersion> for TlsVersion {
    fn from(version: TlsMinVersion) -> Self {
        match version {
            TlsMinVersion::Tls10 => TlsVersion::Tlsv10,
            TlsMinVersion::Tls11 => TlsVersion::Tlsv11,
            TlsMinVersion::Tls12 => TlsVersion::Tlsv12,
            TlsMinVersion::Tls13 => TlsVersion::Tlsv13,
        }
    }
}

/// SMTP configuration
#[derive(Clone, Parser)]
pub struct SmtpConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "587")]
    pub port: u16,

    /// Use implicit TLS from the first byte (SMTPS) instead of STARTTLS
    #[clap(
        long = "smtp-secure",
        env = "SMTP_SECURE",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub secure: bool,

    /// The SMTP username, also used as the sender unless `SMTP_FROM` is set
    #[clap(long = "smtp-user", env = "SMTP_USER")]
    pub username: String,

    /// The SMTP password
    #[clap(long = "smtp-pass", env = "SMTP_PASS", hide_env_values = true)]
    pub password: String,

    /// Sender mailbox, e.g. `Gateway <noreply@example.com>`
    #[clap(long = "smtp-from", env = "SMTP_FROM")]
    pub from: Option<String>,

    /// Refuse to send unless the server offers STARTTLS
    #[clap(
        long = "smtp-require-tls",
        env = "SMTP_REQUIRE_TLS",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub require_tls: bool,

    /// Minimum TLS version: TLSv1, TLSv1.1, TLSv1.2 or TLSv1.3
    #[clap(
        long = "smtp-tls-min-version",
        env = "SMTP_TLS_MIN_VERSION",
        default_value = "TLSv1.2"
    )]
    pub tls_min_version: TlsMinVersion,

    /// Verify the server certificate and hostname
    #[clap(
        long = "smtp-tls-reject-unauthorized",
        env = "SMTP_TLS_REJECT_UNAUTHORIZED",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub reject_unauthorized: bool,

    /// Connection timeout in milliseconds
    #[clap(
        long = "smtp-connection-timeout-ms",
        env = "SMTP_CONNECTION_TIMEOUT_MS",
        default_value = "10000"
    )]
    pub connection_timeout_ms: u64,

    /// Socket inactivity timeout in milliseconds
    #[clap(
        long = "smtp-socket-timeout-ms",
        env = "SMTP_SOCKET_TIMEOUT_MS",
        default_value = "10000"
    )]
    pub socket_timeout_ms: u64,
}

impl SmtpConfig {
    /// The sender mailbox as configured
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }

    /// lettre applies one timeout to connecting and to every socket operation,
    /// so the longer of the two configured bounds is used.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms.max(self.socket_timeout_ms))
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("SMTP_HOST must not be empty");
        }

        if self.username.trim().is_empty() || self.password.is_empty() {
            bail!("SMTP_USER and SMTP_PASS are required");
        }

        Ok(())
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &"********")
            .field("from", &self.from)
            .field("require_tls", &self.require_tls)
            .field("tls_min_version", &self.tls_min_version)
            .field("reject_unauthorized", &self.reject_unauthorized)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .field("socket_timeout_ms", &self.socket_timeout_ms)
            .finish()
    }
}

/// SMTP mailer
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Create a new SMTP mailer.
    ///
    /// No connection is made until the first send or connectivity check.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        config.validate()?;

        let sender: Mailbox = config
            .sender()
            .parse()
            .with_context(|| format!("invalid sender address \"{}\"", config.sender()))?;

        let tls_parameters = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(!config.reject_unauthorized)
            .dangerous_accept_invalid_hostnames(!config.reject_unauthorized)
            .set_min_tls_version(config.tls_min_version.native_floor())
            .build()
            .context("failed to build TLS parameters")?;

        let tls = if config.secure {
            Tls::Wrapper(tls_parameters)
        } else if config.require_tls {
            Tls::Required(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout()))
            .build();

        debug!(host = %config.host, port = config.port, "SMTP transport initialized");

        Ok(Self { transport, sender })
    }

    fn message(&self, email: &OutgoingEmail, message_id: &str) -> Result<Message, MailerError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .mailbox(To::from(parse_mailboxes(&email.to)?))
            .subject(email.subject.clone())
            .message_id(Some(message_id.to_string()));

        if let Some(cc) = &email.cc {
            builder = builder.mailbox(Cc::from(parse_mailboxes(cc)?));
        }

        if let Some(bcc) = &email.bcc {
            builder = builder.mailbox(Bcc::from(parse_mailboxes(bcc)?));
        }

        let message = match &email.body {
            EmailBody::Html(html) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
            EmailBody::Plain(text) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
        };

        message.map_err(|err| MailerError::InvalidMessage(err.to_string()))
    }

    fn next_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.sender.email.domain())
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("sender", &self.sender.to_string())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<SentEmail, MailerError> {
        let message_id = self.next_message_id();
        let message = self.message(email, &message_id)?;

        match self.transport.send(message).await {
            Ok(response) => {
                debug!(code = %response.code(), "SMTP server accepted message");

                Ok(SentEmail {
                    message_id: Some(message_id),
                })
            }
            Err(err) => Err(MailerError::Transport(err.to_string())),
        }
    }

    async fn verify_connection(&self) -> Result<(), MailerError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailerError::Connectivity(
                "SMTP server did not respond to NOOP".to_string(),
            )),
            Err(err) => Err(MailerError::Connectivity(err.to_string())),
        }
    }
}

fn parse_mailboxes(raw: &str) -> Result<Mailboxes, MailerError> {
    raw.parse()
        .map_err(|_| MailerError::InvalidAddress(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig::parse_from([
            "test",
            "--smtp-host",
            "smtp.example.com",
            "--smtp-user",
            "gateway@example.com",
            "--smtp-pass",
            "secret",
        ])
    }

    fn email(body: EmailBody) -> OutgoingEmail {
        OutgoingEmail {
            to: "a@x.com, b@x.com".to_string(),
            cc: Some("c@x.com".to_string()),
            bcc: None,
            subject: "Hello".to_string(),
            body,
        }
    }

    #[test]
    fn test_tls_min_version_from_str() -> TestResult {
        assert_eq!("TLSv1".parse::<TlsMinVersion>()?, TlsMinVersion::Tls10);
        assert_eq!("TLSv1.1".parse::<TlsMinVersion>()?, TlsMinVersion::Tls11);
        assert_eq!("TLSv1.2".parse::<TlsMinVersion>()?, TlsMinVersion::Tls12);
        assert_eq!("TLSv1.3".parse::<TlsMinVersion>()?, TlsMinVersion::Tls13);
        assert_eq!("SSLv3".parse::<TlsMinVersion>()?, TlsMinVersion::Tls11);

        Ok(())
    }

    #[test]
    fn test_config_defaults() {
        let config = config();

        assert_eq!(config.port, 587);
        assert!(!config.secure);
        assert!(!config.require_tls);
        assert!(config.reject_unauthorized);
        assert_eq!(config.tls_min_version, TlsMinVersion::Tls12);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.sender(), "gateway@example.com");
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let debug = format!("{:?}", config());

        assert!(debug.contains("********"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_boolean_flags_take_values() {
        let config = SmtpConfig::parse_from([
            "test",
            "--smtp-host",
            "smtp.example.com",
            "--smtp-user",
            "gateway@example.com",
            "--smtp-pass",
            "secret",
            "--smtp-tls-reject-unauthorized",
            "false",
            "--smtp-secure",
            "true",
            "--smtp-require-tls",
            "yes",
        ]);

        assert!(!config.reject_unauthorized);
        assert!(config.secure);
        assert!(config.require_tls);
    }

    #[tokio::test]
    async fn test_tls13_minimum_still_builds() -> TestResult {
        let mut config = config();
        config.tls_min_version = TlsMinVersion::Tls13;

        SmtpMailer::new(&config)?;

        Ok(())
    }

    #[tokio::test]
    async fn test_config_rejects_blank_credentials() {
        let mut config = config();
        config.password = String::new();

        assert!(SmtpMailer::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_sender_override() -> TestResult {
        let mut config = config();
        config.from = Some("Gateway <noreply@example.org>".to_string());

        let mailer = SmtpMailer::new(&config)?;

        assert!(mailer.next_message_id().ends_with("@example.org>"));

        Ok(())
    }

    #[tokio::test]
    async fn test_builds_plain_text_message() -> TestResult {
        let mailer = SmtpMailer::new(&config())?;

        let message = mailer.message(
            &email(EmailBody::Plain("Hi there".to_string())),
            "<1@example.com>",
        )?;
        let formatted = String::from_utf8(message.formatted())?;

        assert!(formatted.contains("From: gateway@example.com"));
        assert!(formatted.contains("To: a@x.com, b@x.com"));
        assert!(formatted.contains("Cc: c@x.com"));
        assert!(formatted.contains("Message-ID: <1@example.com>"));
        assert!(formatted.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(formatted.contains("Hi there"));

        Ok(())
    }

    #[tokio::test]
    async fn test_builds_html_message() -> TestResult {
        let mailer = SmtpMailer::new(&config())?;

        let message = mailer.message(
            &email(EmailBody::Html("<p>Hi</p>".to_string())),
            "<2@example.com>",
        )?;
        let formatted = String::from_utf8(message.formatted())?;

        assert!(formatted.contains("Content-Type: text/html; charset=utf-8"));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_reported() -> TestResult {
        let mailer = SmtpMailer::new(&config())?;

        let mut email = email(EmailBody::Plain("Hi".to_string()));
        email.to = "not an address".to_string();

        let result = mailer.message(&email, "<3@example.com>");

        assert!(
            matches!(result, Err(MailerError::InvalidAddress(ref raw)) if raw == "not an address")
        );

        Ok(())
    }
}
