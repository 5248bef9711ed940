use axum::{
    Router,
    routing::{get, post},
};

use http::{HeaderValue, Method, header};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod sheets;
mod mail;

mod crypto {
    pub mod token;
}

mod models {
    pub mod lead;
}

mod repositories {
    pub mod lead;
}

mod services {
    pub mod contact;
    pub mod trial;
}

mod handlers {
    pub mod diagnostics;
    pub mod download;
    pub mod forms;
}

mod validation {
    pub mod lead;
}

use config::Config;
use error::AppError;
use state::AppState;

/// Fallback for routes hit with an unsupported HTTP method.
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config)?;
    tracing::info!("✅ AppState initialized");

    let cors = if config.allowed_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin(config.allowed_origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    let app = Router::new()
        .route("/api/forms", post(handlers::forms::submit))
        .route("/download", get(handlers::download::redeem))
        .route("/api/diagnostics/env", get(handlers::diagnostics::env_report))
        .route("/api/diagnostics/deps", get(handlers::diagnostics::deps_report))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
