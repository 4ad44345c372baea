//! Generation provider client
//!
//! Two entry points:
//! - `generate_tracks` - synchronous two-track generation under a hard timeout
//! - `start_job` - asynchronous job start (provider calls back later), with
//!   bounded retry on overload

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::retry::{start_with_retry, with_timeout, RetryPolicy};
use super::transport::UpstreamTransport;
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::order::VocalMode;

const TRACK_MODEL: &str = "custmod-v5";
const JOB_MODEL: &str = "V5";
const DEFAULT_TITLE: &str = "Custom Song";
const MAX_TITLE_CHARS: usize = 80;
const TRACK_COUNT: u32 = 2;

/// Input for two-track generation
#[derive(Debug, Clone)]
pub struct TrackRequest {
    pub title: String,
    pub lyrics: String,
    pub tags: Vec<String>,
    pub language: String,
    pub vocal_mode: VocalMode,
}

/// Download links of the generated tracks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedTracks {
    pub link1: String,
    pub link2: String,
}

/// Input for an asynchronous generation job
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub title: String,
    pub style: String,
    pub lyrics: String,
    pub instrumental: bool,
    pub callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    #[serde(default)]
    tracks: Vec<TrackEntry>,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    #[serde(default)]
    download_url: Option<String>,
}

/// Client for the music generation provider
pub struct GenerationClient {
    transport: Arc<dyn UpstreamTransport>,
    config: GenerationConfig,
}

impl GenerationClient {
    pub fn new(transport: Arc<dyn UpstreamTransport>, config: GenerationConfig) -> Self {
        Self { transport, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some() && !self.config.base_url.is_empty()
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.config.max_attempts,
            backoff_base: self.config.backoff_base,
        }
    }

    fn headers(&self) -> Result<Vec<(String, String)>, GenerationError> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or(GenerationError::NotConfigured("SUNO_API_KEY"))?;
        if self.config.base_url.is_empty() {
            return Err(GenerationError::NotConfigured("SUNO_BASE_URL"));
        }
        Ok(vec![
            ("Authorization".to_string(), format!("Bearer {}", key)),
            ("Content-Type".to_string(), "application/json".to_string()),
        ])
    }

    /// Generate two tracks. The whole call races the configured deadline.
    pub async fn generate_tracks(
        &self,
        request: &TrackRequest,
    ) -> Result<GeneratedTracks, GenerationError> {
        let headers = self.headers()?;
        let url = format!("{}/v1/generate", self.config.base_url);
        let payload = track_payload(request);

        let response = with_timeout(
            self.config.timeout,
            self.transport.post_json(&url, &headers, &payload),
        )
        .await?;

        if !response.is_success() {
            return Err(GenerationError::Rejected {
                status: response.status,
                body: response.body.chars().take(500).collect(),
            });
        }

        let parsed: TracksResponse = serde_json::from_str(&response.body)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        let link = |i: usize| {
            parsed
                .tracks
                .get(i)
                .and_then(|t| t.download_url.clone())
                .unwrap_or_default()
        };
        let tracks = GeneratedTracks {
            link1: link(0),
            link2: link(1),
        };

        if tracks.link1.is_empty() && tracks.link2.is_empty() {
            return Err(GenerationError::NoTracks);
        }

        info!(title = %request.title, "Generated tracks");
        Ok(tracks)
    }

    /// Start an asynchronous generation job and return the provider task id.
    pub async fn start_job(&self, request: &JobRequest) -> Result<String, GenerationError> {
        let headers = self.headers()?;
        let url = format!("{}/api/v1/generate", self.config.base_url);
        let payload = job_payload(request);

        let started = start_with_retry(
            self.transport.as_ref(),
            &self.retry_policy(),
            &url,
            &headers,
            &payload,
        )
        .await?;

        let task_id = started
            .data
            .pointer("/data/taskId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("missing data.taskId".to_string()))?;

        info!(
            task_id,
            attempts = started.attempts,
            "Generation job started"
        );
        Ok(task_id.to_string())
    }
}

fn clamp_title(title: &str) -> String {
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.chars().take(MAX_TITLE_CHARS).collect()
    }
}

fn track_payload(request: &TrackRequest) -> Value {
    let language = if request.language.is_empty() {
        crate::order::DEFAULT_LANGUAGE
    } else {
        request.language.as_str()
    };
    json!({
        "model": TRACK_MODEL,
        "title": clamp_title(&request.title),
        "lyrics": request.lyrics,
        "language": language,
        "tags": request.tags,
        "vocals": request.vocal_mode.as_str(),
        "count": TRACK_COUNT,
    })
}

fn job_payload(request: &JobRequest) -> Value {
    let mut payload = json!({
        "customMode": true,
        "model": JOB_MODEL,
        "instrumental": request.instrumental,
        "title": request.title,
        "style": request.style,
        "prompt": request.lyrics,
    });
    if let Some(url) = &request.callback_url {
        payload["callBackUrl"] = Value::String(url.clone());
    }
    payload
}
