use axum::{extract::OriginalUri, middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth;
use super::greeting;
use super::health;
use super::state::AppState;
use super::types::ApiError;

/// Create the full router with application state.
///
/// Layer order matters: CORS is outermost so its headers land on every
/// response, including error responses.
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(greeting::greeting))
        .route("/health", get(health::health_check))
        // Auth routes live at the root: /login, /logout, /callback
        .merge(auth::create_auth_router())
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(super::middleware::request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}
