use axum::extract::DefaultBodyLimit;
use axum::middleware::map_response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::ApiState;

pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body_bytes = state.config.server.max_body_bytes;

    let api = Router::new()
        .route(
            "/analyze",
            post(handlers::analyze).fallback(handlers::method_not_allowed),
        )
        .route(
            "/safety-check",
            post(handlers::safety_check).fallback(handlers::method_not_allowed),
        )
        .route(
            "/extract-document",
            post(handlers::extract_document).fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health_check));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(map_response(handlers::payload_too_large_as_json))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
