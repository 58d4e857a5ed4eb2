//! Send email tool

use rmcp::model::{CallToolResult, Content, ErrorData, JsonObject, Tool};
use serde_json::json;

use crate::domain::communication::{
    requests::{MAX_BODY_CHARS, MAX_SUBJECT_CHARS, MAX_TO_CHARS},
    EmailService, SendEmailError, SendEmailRequest, SendReceipt,
};

use super::{input_schema, SEND_EMAIL};

/// Tool definition, including the argument schema advertised to clients
pub fn definition() -> Tool {
    Tool::new(
        SEND_EMAIL,
        "Send an email through the configured SMTP account. Recipient fields accept \
         comma-separated addresses.",
        input_schema(json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": MAX_TO_CHARS,
                    "description": "Comma-separated recipient addresses"
                },
                "subject": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": MAX_SUBJECT_CHARS,
                    "description": "Subject line"
                },
                "body": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": MAX_BODY_CHARS,
                    "description": "Message body"
                },
                "isHtml": {
                    "type": "boolean",
                    "default": false,
                    "description": "Send the body as HTML instead of plain text"
                },
                "cc": {
                    "type": "string",
                    "description": "Comma-separated carbon-copy addresses"
                },
                "bcc": {
                    "type": "string",
                    "description": "Comma-separated blind carbon-copy addresses"
                }
            },
            "required": ["to", "subject", "body"]
        })),
    )
}

/// Validates the raw arguments and hands the request to the email service
pub async fn handler<S: EmailService>(
    service: &S,
    arguments: Option<&JsonObject>,
) -> Result<CallToolResult, ErrorData> {
    let request = SendEmailRequest::validate(arguments).map_err(SendEmailError::from)?;

    let receipt = service.send_email(request).await?;

    Ok(CallToolResult::success(vec![Content::text(confirmation(
        &receipt,
    ))]))
}

fn confirmation(receipt: &SendReceipt) -> String {
    match &receipt.message_id {
        Some(id) => format!(
            "Email sent to {} recipient(s). Message ID: {id}",
            receipt.recipients
        ),
        None => format!("Email sent to {} recipient(s).", receipt.recipients),
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;
    use serde_json::Value;
    use testresult::TestResult;

    use crate::domain::communication::tests::MockEmailService;

    use super::*;

    fn arguments(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        }
    }

    fn text(result: &CallToolResult) -> TestResult<String> {
        let value = serde_json::to_value(result)?;

        Ok(value["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    #[tokio::test]
    async fn test_send_email_success() -> TestResult {
        let mut service = MockEmailService::new();

        service
            .expect_send_email()
            .times(1)
            .withf(|request| {
                request.to == "a@x.com, b@x.com" && request.is_html && request.cc.is_none()
            })
            .returning(|_| {
                Ok(SendReceipt {
                    recipients: 2,
                    message_id: Some("<id@x.com>".to_string()),
                })
            });

        let args = arguments(json!({
            "to": "a@x.com, b@x.com",
            "subject": "Hi",
            "body": "<b>Hello</b>",
            "isHtml": true,
        }));

        let result = handler(&service, Some(&args)).await?;

        assert_eq!(
            text(&result)?,
            "Email sent to 2 recipient(s). Message ID: <id@x.com>"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_arguments_never_reach_service() {
        let mut service = MockEmailService::new();
        service.expect_send_email().times(0);

        let args = arguments(json!({ "to": "a@x.com", "body": 7 }));

        let result = handler(&service, Some(&args)).await;

        assert!(matches!(
            result,
            Err(ref err) if err.code == ErrorCode::INVALID_PARAMS
                && err.message == "Invalid arguments: subject: is required; body: must be a string"
        ));
    }

    #[tokio::test]
    async fn test_service_errors_are_mapped() {
        let mut service = MockEmailService::new();

        service
            .expect_send_email()
            .times(1)
            .returning(|_| Err(SendEmailError::RateLimitExceeded { limit: 1 }));

        let args = arguments(json!({ "to": "a@x.com", "subject": "Hi", "body": "Hello" }));

        let result = handler(&service, Some(&args)).await;

        assert!(matches!(result, Err(ref err) if err.code == ErrorCode::INVALID_REQUEST));
    }

    #[test]
    fn test_confirmation_without_message_id() {
        let receipt = SendReceipt {
            recipients: 3,
            message_id: None,
        };

        assert_eq!(confirmation(&receipt), "Email sent to 3 recipient(s).");
    }

    #[test]
    fn test_definition_requires_core_fields() {
        let tool = definition();

        assert_eq!(
            tool.input_schema["required"],
            json!(["to", "subject", "body"])
        );
    }
}
