//! Gateway configuration

use std::convert::Infallible;

use clap::{builder::BoolishValueParser, ArgAction, Parser};

use crate::{
    domain::admission::{AllowList, SendLimit},
    infrastructure::email::smtp::SmtpConfig,
};

/// Command-line arguments / environment variables
#[derive(Debug, Clone, Parser)]
#[command(name = "mail-gateway", version, about = "Outbound email tools over MCP stdio")]
pub struct GatewayConfig {
    /// The SMTP transport configuration
    #[clap(flatten)]
    pub smtp: SmtpConfig,

    /// Sends admitted per minute; zero, negative or non-numeric disables limiting
    #[clap(
        long,
        env = "RATE_LIMIT_PER_MINUTE",
        default_value = "10",
        allow_hyphen_values = true
    )]
    pub rate_limit_per_minute: SendLimit,

    /// Comma-separated recipient addresses; empty permits any recipient
    #[clap(
        long,
        env = "ALLOWED_RECIPIENTS",
        default_value = "",
        value_parser = parse_allow_list
    )]
    pub allowed_recipients: AllowList,

    /// Log at debug level, including the SMTP conversation
    #[clap(
        long = "smtp-debug",
        env = "SMTP_DEBUG",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,
}

fn parse_allow_list(raw: &str) -> Result<AllowList, Infallible> {
    Ok(AllowList::from_csv(raw))
}
