mod config;
mod errors;
mod extract;
mod llm;
mod metrics;
mod routes;
mod services;
mod store;
mod translate;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use llm::{AnswerProvider, OpenAiAnswerer, StaticAnswerer};
use store::InMemoryStore;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;
use translate::{HttpTranslator, NoopTranslator, Translator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = Arc::new(config::AppConfig::load()?);

    // 2. Setup logging
    let filter = EnvFilter::new(&config.observability.log_level);
    if config.observability.json_logging {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting LexPlain v{}", env!("CARGO_PKG_VERSION"));

    // 3. Initialize metrics
    let metrics_router = metrics::setup_metrics()?;

    // 4. Initialize the session store
    let store = Arc::new(InMemoryStore::new(config.session_ttl()));
    info!(ttl_secs = config.session.ttl_secs, "Session store ready");

    // 5. Wire collaborators
    let answerers = build_answerers(&config.llm);
    let translator: Arc<dyn Translator> = if config.translation.enabled {
        Arc::new(HttpTranslator::new(
            config.translation.api_url.clone(),
            config.translation.api_key.clone(),
            std::time::Duration::from_secs(config.translation.timeout_secs),
        ))
    } else {
        Arc::new(NoopTranslator)
    };

    // 6. Initialize app state and router
    let state = services::AppState::new(config.clone(), store, answerers, translator);
    let app = routes::create_router(state, metrics_router);

    // 7. Start the server
    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Pending expiry tasks only delete already-unreachable state; dropping
    // them with the store is safe.
    info!("Server shutdown complete");
    Ok(())
}

/// Build the ordered answer-provider chain from configuration.
/// An api_key of "mock" selects the deterministic local provider.
fn build_answerers(cfg: &config::LlmConfig) -> Vec<Arc<dyn AnswerProvider>> {
    if cfg.api_key == "mock" {
        info!("Using deterministic local answer provider");
        return vec![Arc::new(StaticAnswerer)];
    }

    let timeout = std::time::Duration::from_secs(cfg.timeout_secs);
    let mut chain: Vec<Arc<dyn AnswerProvider>> = vec![Arc::new(OpenAiAnswerer::new(
        "primary",
        cfg.api_url.clone(),
        cfg.api_key.clone(),
        cfg.model.clone(),
        cfg.temperature,
        timeout,
    ))];

    if let Some(fallback_url) = &cfg.fallback_api_url {
        chain.push(Arc::new(OpenAiAnswerer::new(
            "fallback",
            fallback_url.clone(),
            cfg.fallback_api_key.clone().unwrap_or_else(|| cfg.api_key.clone()),
            cfg.fallback_model.clone().unwrap_or_else(|| cfg.model.clone()),
            cfg.temperature,
            timeout,
        )));
        info!("Answer provider fallback configured");
    }

    chain
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
