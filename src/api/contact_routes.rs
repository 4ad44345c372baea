//! Contact form endpoint

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::{ApiError, AppState};
use crate::delivery::notifications::contact_notice;

#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// POST /api/contact
///
/// Responds as soon as the staff notice is handed to the background
/// dispatcher. Without a staff address the message is only logged.
pub async fn contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = req.email.trim();
    let message = req.message.trim();
    if email.is_empty() || !email.contains('@') || message.is_empty() {
        return Err(ApiError::bad_request("Missing email or message."));
    }

    match state.notify_to.as_deref() {
        Some(notify_to) => state.dispatch(vec![contact_notice(
            notify_to,
            req.name.trim(),
            email,
            message,
        )]),
        None => warn!(
            email,
            chars = message.chars().count(),
            "NOTIFY_TO not set, contact message not forwarded"
        ),
    }

    Ok(Json(json!({ "ok": true })))
}
