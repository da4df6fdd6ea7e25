// Vacancy Engine - Web Server
// REST API with Axum over the analysis engine

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vacancy_engine::{EngineConfig, PropertyFilters, VacancyEngine};

const ADDR_ENV_VAR: &str = "VACANCY_SERVER_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Shared application state
#[derive(Clone)]
struct AppState {
    engine: VacancyEngine,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize)]
struct AnalyzeParams {
    address: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(vacancy_engine::VERSION))
}

/// GET /api/analyze?address=... - Analyze one address
async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> impl IntoResponse {
    let address = params.address.unwrap_or_default();
    if address.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("missing address parameter")),
        )
            .into_response();
    }

    let report = state.engine.analyze(address.trim()).await;
    (StatusCode::OK, Json(ApiResponse::ok(report))).into_response()
}

/// GET /api/properties/:id - Stored property or re-analysis from the id
async fn get_property(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.engine.get_by_identifier(&id).await {
        Some(property) => (StatusCode::OK, Json(ApiResponse::ok(property))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("no property for id {}", id))),
        )
            .into_response(),
    }
}

/// GET /api/properties?location=...&min_score=... - Filtered search
async fn search_properties(
    State(state): State<AppState>,
    Query(filters): Query<PropertyFilters>,
) -> impl IntoResponse {
    let properties = state.engine.search(&filters).await;
    Json(ApiResponse::ok(properties))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vacancy_engine=info,vacancy_server=info")),
        )
        .init();

    println!("🌐 Vacancy Engine - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    info!(
        radius_m = config.transaction_radius_m,
        retries = config.retries,
        "engine configured"
    );

    // Create shared state
    let state = AppState {
        engine: VacancyEngine::with_http_sources(config),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/analyze", get(analyze))
        .route("/properties", get(search_properties))
        .route("/properties/:id", get(get_property))
        .with_state(state);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    // Start server
    let addr = std::env::var(ADDR_ENV_VAR).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/analyze?address=...", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
