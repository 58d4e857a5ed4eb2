#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! MCP stdio server for sending email

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mail_gateway::{
    domain::{
        communication::{mailer::Mailer, EmailServiceImpl},
        state::GatewayState,
    },
    infrastructure::{config::GatewayConfig, email::smtp::SmtpMailer, mcp::MailGatewayServer},
};
use rmcp::{transport::stdio, ServiceExt};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = GatewayConfig::parse();

    // stdout carries the protocol, so logs go to stderr
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    std::panic::set_hook(Box::new(|panic| error!("panic: {panic}")));

    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);

    match mailer.verify_connection().await {
        Ok(()) => info!(host = %config.smtp.host, "SMTP connection verified"),
        Err(e) => warn!(host = %config.smtp.host, "SMTP connection check failed: {e}"),
    }

    let limit = config.rate_limit_per_minute;
    let allow_list_entries = config.allowed_recipients.len();

    let service = EmailServiceImpl::new(
        mailer,
        config.allowed_recipients,
        Arc::new(GatewayState::new(limit)),
    );

    info!(%limit, allow_list_entries, "starting mail gateway on stdio");

    let server = MailGatewayServer::new(service, limit, allow_list_entries)
        .serve(stdio())
        .await?;

    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    let reason = server.waiting().await?;
    info!(?reason, "mail gateway stopped");

    Ok(())
}

#[mutants::skip]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
