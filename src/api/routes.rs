use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors_permissive = state.config.cors_permissive;

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state);

    let router = if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    // Request id runs first so the trace span can read it
    router.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
    )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/providers/expand", post(handlers::expand_providers))
        .route("/offers/correlate", post(handlers::correlate_offer))
        .route("/availability/resolve", post(handlers::resolve_availability))
        .route("/deep-links/normalize", post(handlers::normalize_deep_links))
}
