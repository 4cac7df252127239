use anyhow::{Context, Result};
use chat_translator::{
    chat_type::ChatTypeRegistry,
    config::Config,
    geolocation::HttpGeolocation,
    interceptor::ChatInterceptor,
    onboarding::NewUserOnboarding,
    pattern::PatternExtractor,
    server::{self, AppState},
    store::MemoryStore,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_translator=info".parse()?),
        )
        .init();

    info!("Starting chat translator bridge");

    let config = Config::from_env()?;
    info!(
        "Loaded {} match patterns from {}",
        config.match_include.len(),
        config.match_config_path
    );

    // A broken pattern set is a deployment error: refuse to start
    let extractor = PatternExtractor::new(&config.match_include)
        .context("Invalid match.include configuration")?;

    let store = Arc::new(MemoryStore::new());
    let geolocation = Arc::new(HttpGeolocation::new(
        reqwest::Client::new(),
        config.geolocation_api_url.clone(),
    ));

    let interceptor = ChatInterceptor::new(
        store.clone(),
        Arc::new(extractor),
        Arc::new(ChatTypeRegistry::vanilla()),
        config.translate_command.clone(),
    );
    let onboarding = NewUserOnboarding::new(store, geolocation);

    let state = AppState {
        interceptor: Arc::new(interceptor),
        onboarding: Arc::new(onboarding),
        api_key: config.bridge_api_key.as_deref().map(Arc::from),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
