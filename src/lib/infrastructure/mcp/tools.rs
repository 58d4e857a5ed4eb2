//! Tool definitions and handlers

use rmcp::model::{JsonObject, Tool};
use serde_json::Value;

pub mod health_check;
pub mod send_email;

/// Name of the send tool
pub const SEND_EMAIL: &str = "send_email";

/// Name of the diagnostics tool
pub const HEALTH_CHECK: &str = "health_check";

/// Every tool this server provides
pub fn definitions() -> Vec<Tool> {
    vec![send_email::definition(), health_check::definition()]
}

fn input_schema(schema: Value) -> JsonObject {
    match schema {
        Value::Object(object) => object,
        _ => JsonObject::new(),
    }
}
