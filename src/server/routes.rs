use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::*;

/// REST API router
pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .route("/bootcamps", get(get_all_bootcamps).post(create_bootcamp))
        .route(
            "/bootcamps/{id}",
            get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
        )
        .route(
            "/bootcamps/radius/{zipcode}/{distance}",
            get(get_bootcamps_in_radius),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

/// WebSocket router; every path upgrades, plain requests get a short text reply
pub fn create_ws_router() -> Router {
    Router::new()
        .fallback(ws_entry)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("Ignoring invalid CORS origin, allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
