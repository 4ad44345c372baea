//! REST API
//!
//! ## Endpoints
//!
//! - `GET /api/ping` - liveness with server timestamp
//! - `POST /api/generate_song` - compose, sanitize, generate, log, notify
//! - `POST /api/contact` - forward a contact message to staff
//! - `POST /api/checkout` - rate-limited payment session creation
//!
//! Any other GET is answered from the static front end, with `index.html`
//! for paths that name no file.

pub mod checkout_routes;
pub mod contact_routes;
pub mod song_routes;
pub mod state;

use std::path::Path;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub use state::AppState;

/// Error body shared by every endpoint: `{ok: false, message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "ok": false, "message": self.message })),
        )
            .into_response()
    }
}

/// Build the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/generate_song", post(song_routes::generate_song))
        .route("/api/contact", post(contact_routes::contact))
        .route("/api/checkout", post(checkout_routes::checkout))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

/// Serve the single-page front end from `dir` behind the API routes
pub fn with_frontend(router: Router, dir: impl AsRef<Path>) -> Router {
    let dir = dir.as_ref();
    let index = ServeFile::new(dir.join("index.html"));
    router.fallback_service(ServeDir::new(dir).fallback(index))
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "ts": Utc::now().to_rfc3339() }))
}
