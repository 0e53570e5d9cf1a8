//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Orders:
///   - POST /api/v2/orders - Create order
///   - GET  /api/v2/orders/{order_id} - Get order
///   - POST /api/v2/orders/{order_id}/capture - Capture approved order
///   - POST /api/v2/orders/{order_id}/authorize - Authorize approved order
///
/// - Payments:
///   - POST /api/v2/authorizations/{authorization_id}/capture - Capture authorization
///   - POST /api/v2/captures/{capture_id}/refund - Refund capture
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api_routes = Router::new()
        // Orders
        .route("/orders", post(handlers::create_order))
        .route("/orders/{order_id}", get(handlers::get_order))
        .route("/orders/{order_id}/capture", post(handlers::capture_order))
        .route("/orders/{order_id}/authorize", post(handlers::authorize_order))
        // Payments
        .route(
            "/authorizations/{authorization_id}/capture",
            post(handlers::capture_authorization),
        )
        .route("/captures/{capture_id}/refund", post(handlers::refund_capture));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v2", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins, or any origin when none are set
/// (or `*` is among them)
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}
