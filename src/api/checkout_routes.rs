//! Checkout endpoint with per-client admission control

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::{ApiError, AppState};
use crate::checkout::CheckoutRequest;
use crate::error::CheckoutError;

/// POST /api/checkout
pub async fn checkout(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = client_key(&headers, peer.map(|ConnectInfo(addr)| addr));

    if !state
        .rate_limiter
        .allow(&key, state.checkout_window, state.checkout_max)
    {
        warn!(client = %key, "Checkout rate limited");
        return Err(ApiError::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again shortly.",
        ));
    }

    let url = state
        .checkout
        .create_session(&req, &state.return_base)
        .await
        .map_err(|e| {
            error!(error = %e, "Checkout session failed");
            match e {
                CheckoutError::NotConfigured => ApiError::internal("Checkout not configured."),
                _ => ApiError::new(StatusCode::BAD_GATEWAY, "Checkout failed."),
            }
        })?;

    Ok(Json(json!({ "ok": true, "url": url })))
}

/// Admission key: first `X-Forwarded-For` hop, else the peer address
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_key_prefers_forwarded_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );
        let peer: SocketAddr = "10.0.0.2:5000".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_client_key_falls_back_to_peer() {
        let peer: SocketAddr = "198.51.100.4:443".parse().unwrap();
        assert_eq!(client_key(&HeaderMap::new(), Some(peer)), "198.51.100.4");
        assert_eq!(client_key(&HeaderMap::new(), None), "unknown");
    }
}
