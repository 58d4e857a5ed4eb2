//! MCP tool server

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, ErrorData, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    RoleServer, ServerHandler,
};
use tracing::debug;

use crate::domain::{admission::SendLimit, communication::EmailService};

pub mod errors;
pub mod tools;

/// Exposes the email service as the `send_email` and `health_check` tools
#[derive(Debug, Clone)]
pub struct MailGatewayServer<S>
where
    S: EmailService,
{
    service: Arc<S>,
    instructions: String,
}

impl<S> MailGatewayServer<S>
where
    S: EmailService,
{
    /// Create a new server around `service`.
    ///
    /// `limit` and `allow_list_entries` are only used to describe the policy to
    /// clients.
    pub fn new(service: S, limit: SendLimit, allow_list_entries: usize) -> Self {
        Self {
            service: Arc::new(service),
            instructions: instructions(limit, allow_list_entries),
        }
    }

    /// Routes a tool call by name
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(tool = name, "tool call");

        match name {
            tools::SEND_EMAIL => {
                tools::send_email::handler(self.service.as_ref(), arguments).await
            }
            tools::HEALTH_CHECK => Ok(tools::health_check::handler(self.service.as_ref()).await),
            unknown => Err(errors::unknown_tool(unknown)),
        }
    }
}

impl<S> ServerHandler for MailGatewayServer<S>
where
    S: EmailService,
{
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions.clone()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(tools::definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.dispatch(&request.name, request.arguments.as_ref()).await
    }
}

fn instructions(limit: SendLimit, allow_list_entries: usize) -> String {
    let rate = match limit.per_minute() {
        Some(limit) => format!("at most {limit} emails per minute are accepted"),
        None => "sending is not rate limited".to_string(),
    };

    let recipients = match allow_list_entries {
        0 => "any recipient is permitted".to_string(),
        entries => format!("recipients must be one of {entries} allow-listed addresses"),
    };

    format!(
        "Outbound email gateway. Use send_email to send a message and health_check to \
         inspect SMTP connectivity and send limits. Policy: {rate}; {recipients}."
    )
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;
    use serde_json::json;
    use testresult::TestResult;

    use crate::domain::{
        communication::{tests::MockEmailService, SendReceipt},
        health::{Connectivity, HealthReport},
    };

    use super::*;

    fn server(service: MockEmailService) -> MailGatewayServer<MockEmailService> {
        MailGatewayServer::new(service, SendLimit::PerMinute(5), 0)
    }

    #[tokio::test]
    async fn test_dispatch_send_email() -> TestResult {
        let mut service = MockEmailService::new();

        service.expect_send_email().times(1).returning(|_| {
            Ok(SendReceipt {
                recipients: 1,
                message_id: None,
            })
        });

        let arguments = json!({ "to": "a@x.com", "subject": "Hi", "body": "Hello" });

        let result = server(service)
            .dispatch("send_email", arguments.as_object())
            .await?;

        assert_eq!(result.is_error, Some(false));

        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_health_check() -> TestResult {
        let mut service = MockEmailService::new();

        service.expect_health_report().times(1).returning(|| HealthReport {
            smtp: Connectivity::Ok,
            rate_limit: None,
            allow_list_entries: 0,
            last_send: None,
        });

        let result = server(service).dispatch("health_check", None).await?;

        assert_eq!(result.is_error, Some(false));

        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let result = server(MockEmailService::new())
            .dispatch("delete_everything", None)
            .await;

        assert!(matches!(result, Err(ref err) if err.code == ErrorCode::METHOD_NOT_FOUND));
    }

    #[test]
    fn test_instructions_describe_policy() {
        assert!(instructions(SendLimit::PerMinute(3), 2).contains(
            "at most 3 emails per minute are accepted; recipients must be one of 2 allow-listed addresses"
        ));
        assert!(instructions(SendLimit::Disabled, 0)
            .contains("sending is not rate limited; any recipient is permitted"));
    }

    #[test]
    fn test_server_info_enables_tools() {
        let info = server(MockEmailService::new()).get_info();

        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
        assert_eq!(info.server_info.name, "mail-gateway");
    }
}
