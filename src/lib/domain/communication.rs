//! Outbound email: request handling, the transport port and the send service.

pub mod errors;
pub mod mailer;
pub mod outcome;
pub mod recipients;
pub mod requests;
pub mod service;

pub use errors::SendEmailError;
pub use outcome::LastSendOutcome;
pub use requests::{NormalizedEmailRequest, SendEmailRequest, ValidationError};
pub use service::{EmailService, EmailServiceImpl, SendReceipt};
