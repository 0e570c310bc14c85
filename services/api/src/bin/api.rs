//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileKeyValueStore, GeminiAnalysisAdapter, TracingNotifier},
    config::{Config, ConfigError},
    error::ApiError,
    web::{self, ApiDoc, AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use scando_core::Organizer;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Local Storage ---
    info!("Opening data directory {}", config.data_dir.display());
    let storage = Arc::new(FileKeyValueStore::open(&config.data_dir)?);

    // --- 3. Initialize Service Adapters ---
    let client = match &config.gemini_api_key {
        Some(key) => Some(Client::with_config(
            OpenAIConfig::new()
                .with_api_key(key)
                .with_api_base(&config.gemini_api_base),
        )),
        None => {
            warn!("GEMINI_API_KEY is not set; every scan will fail with a configuration error.");
            None
        }
    };
    let analysis = Arc::new(GeminiAnalysisAdapter::new(
        client,
        config.fast_model.clone(),
        config.deep_model.clone(),
    ));
    let notifier = Arc::new(TracingNotifier);

    // --- 4. Build the Shared AppState ---
    let organizer = Organizer::new(storage, analysis, notifier);
    let today = chrono::Local::now().date_naive();
    match organizer.notify_due_today(today).await {
        Ok(due) => info!("{} task(s) due today.", due),
        Err(e) => warn!("Failed to send the due-today reminder: {}", e),
    }
    let app_state = Arc::new(AppState {
        organizer,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let allowed_origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let api_router = web::router(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
