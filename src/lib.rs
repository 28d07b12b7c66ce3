//! Ranklist Backend
//!
//! Collaborative lists with a user-defined item template, anonymous
//! like/dislike voting and drag-reorderable items.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access over SQLite (vote ledger, positioning, rankings)
//! - routes: HTTP handlers that bridge clients to the repositories

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;

use config::Config;
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let config = Config::load();
    let state = AppState::new(config).expect("Failed to initialize application state");

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/lists", post(routes::create_list).get(routes::get_lists))
        .route("/api/lists/{id}", get(routes::get_list))
        .route("/api/lists/{id}/items", post(routes::add_item))
        .route("/api/lists/{id}/items/reorder", put(routes::reorder_items))
        .route("/api/lists/{id}/top-voted", get(routes::top_voted))
        .route(
            "/api/lists/{id}/voting-activity",
            get(routes::voting_activity),
        )
        .route("/api/items/{id}", delete(routes::delete_item))
        .route(
            "/api/items/{id}/vote",
            post(routes::cast_vote).delete(routes::retract_vote),
        )
        .route("/api/items/{id}/like", post(routes::like_item))
        .route("/api/items/{id}/stats", get(routes::item_stats))
        .route("/api/items/{id}/position", patch(routes::set_position))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .expect("Failed to bind server address");
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
