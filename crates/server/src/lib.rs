// crates/server/src/lib.rs
//! Truck tracker server library.
//!
//! Axum application serving live vehicle positions over a WebSocket push
//! channel, plus request/response query endpoints and an optional static
//! frontend.

pub mod config;
pub mod error;
pub mod live;
pub mod metrics;
pub mod routes;
pub mod snapshot;
pub mod state;

pub use config::Config;
pub use error::*;
pub use metrics::{init_metrics, render_metrics};
pub use routes::api_routes;
pub use state::{AppState, LiveSettings};

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API, live and metrics routes
/// - The static frontend at `/` when `static_dir` is given, otherwise a
///   plain status message
/// - CORS (any origin, method and header)
/// - Request tracing
pub fn create_app(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api_routes(state);
    let app = match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static files");
            app.fallback_service(ServeDir::new(dir))
        }
        None => app.route("/", get(root_message)),
    };

    app.layer(cors).layer(TraceLayer::new_for_http())
}

async fn root_message() -> Json<serde_json::Value> {
    Json(json!({ "message": "Truck Tracker API is running" }))
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use truck_tracker_db::Database;

    async fn app() -> Router {
        let db = Database::new_in_memory().await.expect("in-memory DB");
        create_app(AppState::new(Arc::new(db)), None)
    }

    /// Helper to make a GET request to the app.
    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    // ========================================================================
    // Health Endpoint Tests
    // ========================================================================

    #[tokio::test]
    async fn test_health_endpoint_response_structure() {
        let (status, body) = get(app().await, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert!(json["uptime_secs"].is_number());
    }

    // ========================================================================
    // Root / Static Tests
    // ========================================================================

    #[tokio::test]
    async fn test_root_message_without_static_dir() {
        let (status, body) = get(app().await, "/").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["message"], "Truck Tracker API is running");
    }

    #[tokio::test]
    async fn test_static_dir_served_at_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("index.html"), "<h1>map</h1>").unwrap();

        let db = Database::new_in_memory().await.unwrap();
        let app = create_app(AppState::new(Arc::new(db)), Some(tmp.path().to_path_buf()));

        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>map</h1>");

        // API routes still win over the static fallback
        let (status, _) = get(app, "/api/vehicles").await;
        assert_eq!(status, StatusCode::OK);
    }

    // ========================================================================
    // CORS Tests
    // ========================================================================

    #[tokio::test]
    async fn test_cors_headers() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/trucks")
                    .header("Origin", "http://localhost:3000")
                    .header("Access-Control-Request-Method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(
            response.headers().contains_key("access-control-allow-origin"),
            "Expected access-control-allow-origin header"
        );
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("Origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allow_origin = response.headers().get("access-control-allow-origin");
        assert_eq!(allow_origin.unwrap(), "*");
    }

    // ========================================================================
    // 404 Tests
    // ========================================================================

    #[tokio::test]
    async fn test_404_for_unknown_route() {
        let (status, _body) = get(app().await, "/api/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ws_requires_upgrade() {
        let (status, _body) = get(app().await, "/ws").await;
        assert!(status.is_client_error(), "plain GET on /ws should be rejected, got {status}");
    }

    #[tokio::test]
    async fn test_multiple_requests() {
        let app = app().await;

        let (status1, _) = get(app.clone(), "/health").await;
        assert_eq!(status1, StatusCode::OK);

        let (status2, _) = get(app, "/api/vehicles").await;
        assert_eq!(status2, StatusCode::OK);
    }
}
