use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use build_gateway::config::GatewayConfig;
use build_gateway::dispatch::Dispatcher;
use build_gateway::github::GitHubIntegration;
use build_gateway::server::{AppState, build_router};
use build_gateway::store::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "build_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    info!(config = ?config, "Starting build gateway");

    let store = match &config.projects_file {
        Some(path) => InMemoryStore::from_projects_file(path)?,
        None => InMemoryStore::new(),
    };
    let github = Arc::new(
        GitHubIntegration::from_token(config.github_token.clone(), config.github_api_url.clone())
            .context("building GitHub client")?,
    );
    let dispatcher = Dispatcher::new(
        Arc::new(store),
        github.clone(),
        github,
        config.dispatch.clone(),
    );
    let app = build_router(AppState::new(dispatcher.clone()));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl-C, shutting down");
                    shutdown.cancel();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    info!("listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    dispatcher.drain_background_tasks().await;
    info!("Shutdown complete");
    Ok(())
}
