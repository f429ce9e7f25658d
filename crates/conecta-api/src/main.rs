use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use conecta_api::{
    config::Config,
    middleware::logging,
    routes::{channels, health, webhook},
    state::AppState,
};
use conecta_channels::EchoResponder;
use conecta_persist::StoreClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Conecta webhook relay");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);
    tracing::info!("Debounce window: {}ms", config.debounce.delay_ms);

    tracing::info!("Connecting to MongoDB");
    let store = StoreClient::builder()
        .mongodb_uri(&config.mongodb_uri)
        .database(&config.mongodb.database)
        .build()
        .await?;
    tracing::info!("MongoDB connected");

    // Placeholder responder; a deployment swaps in its AI pipeline here.
    let responder = Arc::new(EchoResponder::new());

    let state = AppState::new(config.clone(), store, responder);

    let app = build_router(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Channel connections
        .route("/channels", post(channels::connect_channel))
        .route("/channels", get(channels::list_channels))
        .route("/channels/:channel", delete(channels::disconnect_channel))
        // Webhooks
        .route("/webhook/:channel", get(webhook::verify_webhook))
        .route("/webhook/:channel", post(webhook::receive_webhook))
        .route("/webhook/:channel/flush", post(webhook::flush_webhook));

    Router::new()
        .merge(api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(30)))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &conecta_api::config::Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed_origin) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed_origin);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
