//! Song order endpoint
//!
//! Pipeline per request: normalize the brief, build both lexicons, compose
//! lyrics, polish and sanitize them, then either start an asynchronous generation job
//! (when a public callback URL is known) or generate two tracks inline under
//! the hard deadline. The order row is logged and notifications go out in the
//! background; the response never waits on delivery.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::{error, info, warn};

use super::{ApiError, AppState};
use crate::content_guard::{build_allowed_lexicon, build_forbidden_lexicon};
use crate::delivery::notifications::staff_order_notice;
use crate::delivery::DeliveryTask;
use crate::error::GenerationError;
use crate::generation::{GeneratedTracks, JobRequest, TrackRequest};
use crate::lyrics::polish::{polish, PolishOptions};
use crate::lyrics::ComposeRequest;
use crate::order::{
    build_tags, detect_special_modes, is_instrumental, normalize_order, pick_vocal_mode,
    OrderBrief, RawOrder,
};
use crate::order_log::OrderRow;

#[derive(Debug, Serialize)]
pub struct GenerateSongResponse {
    pub ok: bool,
    pub lyrics: String,
    pub format: String,
    pub style: String,
    #[serde(rename = "taskId", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub tracks: Vec<String>,
}

/// POST /api/generate_song
pub async fn generate_song(
    State(state): State<AppState>,
    Json(raw): Json<RawOrder>,
) -> Result<Json<GenerateSongResponse>, ApiError> {
    let order = normalize_order(raw);

    if !state.composer.is_configured() || !state.generation.is_configured() {
        return Err(ApiError::internal("Missing API keys."));
    }

    let allowed = build_allowed_lexicon(&order.lexicon_fields());
    let forbidden = build_forbidden_lexicon(&order.extra_forbidden, &allowed);

    let draft = state
        .composer
        .compose(&ComposeRequest {
            language: order.language.clone(),
            styles: order.styles.clone(),
            vocal: order.vocal.clone(),
            brief: order.brief.clone(),
            mandatory_keywords: allowed.to_keyword_list(),
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Lyric composition failed");
            ApiError::internal(e.to_string())
        })?;

    let polished = polish(
        &draft,
        &PolishOptions {
            language: &order.language,
            styles: &order.styles,
            brief: &order.brief,
        },
    );
    let lyrics = forbidden.sanitize(&polished);
    if forbidden.contains_forbidden(&polished) {
        info!(
            forbidden = forbidden.len(),
            allowed = allowed.len(),
            "Removed forbidden terms from lyrics"
        );
    }

    let mut response = GenerateSongResponse {
        ok: true,
        lyrics: lyrics.clone(),
        format: order.format.clone(),
        style: order.styles.clone(),
        task_id: None,
        tracks: Vec::new(),
    };

    if !order.wants_audio() {
        state
            .order_log
            .append_order_row(&OrderRow::from_order(&order, &lyrics))
            .await;
        state.dispatch(notifications(&state, &order, &lyrics, None, None));
        return Ok(Json(response));
    }

    match &state.callback_url {
        Some(callback_url) => {
            let task_id = start_job(&state, &order, &lyrics, callback_url).await?;
            state
                .order_log
                .append_order_row(&OrderRow::from_order(&order, &lyrics))
                .await;
            state.dispatch(notifications(&state, &order, &lyrics, Some(&task_id), None));
            response.task_id = Some(task_id);
        }
        None => {
            let tracks = generate_inline(&state, &order, &lyrics).await?;
            state
                .order_log
                .append_order_row(
                    &OrderRow::from_order(&order, &lyrics)
                        .with_links(tracks.link1.clone(), tracks.link2.clone()),
                )
                .await;
            state.dispatch(notifications(&state, &order, &lyrics, None, Some(&tracks)));
            response.tracks = [tracks.link1, tracks.link2]
                .into_iter()
                .filter(|l| !l.is_empty())
                .collect();
        }
    }

    Ok(Json(response))
}

async fn start_job(
    state: &AppState,
    order: &OrderBrief,
    lyrics: &str,
    callback_url: &str,
) -> Result<String, ApiError> {
    let request = JobRequest {
        title: order.title.clone(),
        style: order.styles.clone(),
        lyrics: lyrics.to_string(),
        instrumental: is_instrumental(&order.vocal),
        callback_url: Some(callback_url.to_string()),
    };
    state.generation.start_job(&request).await.map_err(|e| {
        error!(error = %e, "Generation job start failed");
        generation_failure(&e)
    })
}

async fn generate_inline(
    state: &AppState,
    order: &OrderBrief,
    lyrics: &str,
) -> Result<GeneratedTracks, ApiError> {
    let modes = detect_special_modes(order);
    let request = TrackRequest {
        title: order.title.clone(),
        lyrics: lyrics.to_string(),
        tags: build_tags(&order.styles, &modes),
        language: order.language.clone(),
        vocal_mode: pick_vocal_mode(&order.vocal, &modes),
    };
    state.generation.generate_tracks(&request).await.map_err(|e| {
        warn!(error = %e, "Track generation failed");
        generation_failure(&e)
    })
}

fn generation_failure(e: &GenerationError) -> ApiError {
    match e {
        GenerationError::Timeout(_) => {
            ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Generation timed out.")
        }
        _ => ApiError::new(StatusCode::BAD_GATEWAY, "Generation start failed."),
    }
}

fn notifications(
    state: &AppState,
    order: &OrderBrief,
    lyrics: &str,
    task_id: Option<&str>,
    tracks: Option<&GeneratedTracks>,
) -> Vec<DeliveryTask> {
    let customer = std::iter::once(state.mail.order_confirmation(order, lyrics))
        .chain(tracks.map(|tracks| state.mail.tracks_ready(order, tracks)));

    let mut tasks = Vec::new();
    for rendered in customer {
        match rendered {
            Ok(task) => tasks.push(task),
            Err(e) => error!(error = %e, email = %order.email, "Customer mail not rendered"),
        }
    }
    if let Some(notify_to) = &state.notify_to {
        tasks.push(staff_order_notice(notify_to, order, task_id));
    }
    tasks
}
