//! Health check tool

use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::json;

use crate::domain::communication::EmailService;

use super::{input_schema, HEALTH_CHECK};

/// Tool definition; the tool takes no arguments
pub fn definition() -> Tool {
    Tool::new(
        HEALTH_CHECK,
        "Report SMTP connectivity, rate-limit usage, allow-list status and the last send result.",
        input_schema(json!({ "type": "object", "properties": {} })),
    )
}

/// Renders the service's health report. Probe failures are part of the report,
/// so this never returns an error.
pub async fn handler<S: EmailService>(service: &S) -> CallToolResult {
    let report = service.health_report().await;

    CallToolResult::success(vec![Content::text(report.to_string())])
}
