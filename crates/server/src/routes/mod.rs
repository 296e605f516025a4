//! HTTP and WebSocket route handlers.

pub mod health;
pub mod live;
pub mod metrics;
pub mod trucks;
pub mod vehicles;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Combine every route with the shared state.
///
/// Routes:
/// - GET /health - Liveness probe
/// - GET /metrics - Prometheus scrape endpoint
/// - GET /ws - Live tracking WebSocket
/// - GET /api/trucks - Latest position per vehicle (GeoJSON)
/// - GET /api/trucks/{car_id} - Position history of one vehicle
/// - GET /api/vehicles - Known vehicle ids
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(metrics::router())
        .merge(live::router())
        .nest("/api", trucks::router().merge(vehicles::router()))
        .with_state(state)
}
