//! Tool error mapping

use rmcp::model::{ErrorCode, ErrorData};
use tracing::debug;

use crate::domain::communication::SendEmailError;

impl From<SendEmailError> for ErrorData {
    fn from(err: SendEmailError) -> Self {
        debug!("SendEmailError -> ErrorData: {err}");

        let message = err.to_string();

        match err {
            SendEmailError::Validation(_)
            | SendEmailError::HeaderInjection(_)
            | SendEmailError::EmptyRecipient => ErrorData::invalid_params(message, None),
            SendEmailError::RecipientsNotAllowed(_) | SendEmailError::RateLimitExceeded { .. } => {
                ErrorData::invalid_request(message, None)
            }
            SendEmailError::SendFailed(_) => ErrorData::internal_error(message, None),
        }
    }
}

/// Error for a tool name this server does not provide
pub fn unknown_tool(name: &str) -> ErrorData {
    ErrorData::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("Unknown tool: {name}"),
        None,
    )
}

#[cfg(test)]
mod tests {
    use crate::domain::communication::{
        recipients::HeaderInjectionError,
        requests::{FieldViolation, ValidationError},
    };

    use super::*;

    #[test]
    fn test_caller_errors_are_invalid_params() {
        let errors = [
            SendEmailError::Validation(ValidationError(vec![FieldViolation {
                field: "to",
                message: "is required".to_string(),
            }])),
            SendEmailError::HeaderInjection(HeaderInjectionError { field: "subject" }),
            SendEmailError::EmptyRecipient,
        ];

        for err in errors {
            assert_eq!(ErrorData::from(err).code, ErrorCode::INVALID_PARAMS);
        }
    }

    #[test]
    fn test_admission_errors_are_invalid_request() {
        let error = ErrorData::from(SendEmailError::RecipientsNotAllowed(vec![
            "b@x.com".to_string(),
        ]));

        assert_eq!(error.code, ErrorCode::INVALID_REQUEST);
        assert_eq!(
            error.message,
            "Recipients not permitted by the allow list: b@x.com"
        );

        let error = ErrorData::from(SendEmailError::RateLimitExceeded { limit: 2 });

        assert_eq!(error.code, ErrorCode::INVALID_REQUEST);
    }

    #[test]
    fn test_send_failure_is_internal_error() {
        let error = ErrorData::from(SendEmailError::SendFailed("timed out".to_string()));

        assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(error.message, "Failed to send email: timed out");
    }

    #[test]
    fn test_unknown_tool_is_method_not_found() {
        let error = unknown_tool("nope");

        assert_eq!(error.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(error.message, "Unknown tool: nope");
    }
}
