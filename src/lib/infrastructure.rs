//! Adapters for configuration, the SMTP transport and the MCP tool surface

pub mod config;
pub mod email;
pub mod mcp;
