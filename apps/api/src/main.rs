mod config;
mod errors;
mod oracle;
mod reply;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, OracleConfig, TokenSource};
use crate::oracle::direct::{DirectClient, DirectTransport};
use crate::oracle::rest::{vertex_endpoint, RestTransport};
use crate::oracle::token::{
    AccessToken, CommandTokenProvider, FileTokenProvider, StaticTokenProvider, TokenProvider,
};
use crate::oracle::CompletionOracle;
use crate::reply::catalog::PromptCatalog;
use crate::reply::gateway::CompletionGateway;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=debug",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reply API v{}", env!("CARGO_PKG_VERSION"));

    // Prompt catalog: built-in role scripts unless a catalog file is configured
    let catalog = match &config.catalog_path {
        Some(path) => PromptCatalog::load(path)?,
        None => PromptCatalog::builtin(),
    };
    info!("Prompt catalog loaded ({} categories)", catalog.len());
    debug!("Default instruction: {}", catalog.default_instruction());

    // Oracle transport
    let oracle = build_oracle(&config)?;
    info!(
        "Oracle initialized (transport: {}, model: {}, composition: {})",
        oracle.name(),
        config.model_id,
        config.composition
    );

    let gateway = CompletionGateway::new(Arc::new(catalog), oracle, config.composition);
    let state = AppState {
        gateway: Arc::new(gateway),
    };

    // Permissive CORS is the development posture; production deployments restrict origins.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the configured oracle transport.
fn build_oracle(config: &Config) -> Result<Arc<dyn CompletionOracle>> {
    let http = oracle::http_client(config.upstream_timeout).context("Failed to build HTTP client")?;

    let oracle: Arc<dyn CompletionOracle> = match &config.oracle {
        OracleConfig::Direct { api_key, base_url } => {
            let client = DirectClient::new(http, base_url.as_str(), api_key.expose());
            Arc::new(DirectTransport::new(client, config.model_id.as_str()))
        }
        OracleConfig::Rest {
            project_id,
            region,
            publisher,
            base_url,
            token_source,
        } => {
            let tokens: Arc<dyn TokenProvider> = match token_source {
                TokenSource::Gcloud => {
                    Arc::new(CommandTokenProvider::gcloud(config.upstream_timeout))
                }
                TokenSource::File(path) => Arc::new(FileTokenProvider::new(path.clone())),
                TokenSource::Env(token) => Arc::new(StaticTokenProvider::new(
                    AccessToken::new(token.expose()).context("ACCESS_TOKEN is invalid")?,
                )),
            };
            let endpoint = vertex_endpoint(
                base_url.as_deref(),
                project_id,
                region,
                publisher,
                &config.model_id,
            );
            info!("REST endpoint: {endpoint}");
            Arc::new(RestTransport::new(http, endpoint, tokens))
        }
    };

    Ok(oracle)
}
