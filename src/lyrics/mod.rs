//! Lyric composer collaborator
//!
//! Turns an Order Brief into draft lyrics through an OpenAI-compatible chat
//! completions endpoint. [`polish`] tidies the draft deterministically; the
//! caller sanitizes the result, nothing here filters content.

pub mod polish;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ComposerConfig;
use crate::error::ComposeError;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TOKENS: u32 = 900;
const TEMPERATURE: f32 = 0.7;

/// What the composer needs to know about an order
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
    pub language: String,
    pub styles: String,
    pub vocal: String,
    pub brief: String,
    /// Words the lyrics should contain (the Allowed Lexicon)
    pub mandatory_keywords: Vec<String>,
}

#[async_trait]
pub trait LyricsComposer: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn compose(&self, request: &ComposeRequest) -> Result<String, ComposeError>;
}

/// Chat-completions backed composer
pub struct OpenAiComposer {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiComposer {
    pub fn new(config: &ComposerConfig) -> Result<Self, ComposeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ComposeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: OPENAI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize, Default)]
struct LyricsPayload {
    #[serde(default)]
    lyrics: String,
}

#[async_trait]
impl LyricsComposer for OpenAiComposer {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn compose(&self, request: &ComposeRequest) -> Result<String, ComposeError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ComposeError::Transport("OPENAI_API_KEY not set".to_string()))?;

        let (system, user) = build_prompts(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %self.model, "Calling composer");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ComposeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ComposeError::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ComposeError::Transport(e.to_string()))?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        extract_lyrics(content)
    }
}

/// System and user prompts for a compose request
pub fn build_prompts(request: &ComposeRequest) -> (String, String) {
    let language = request.language.to_lowercase();
    let keywords = if request.mandatory_keywords.is_empty() {
        "(none)".to_string()
    } else {
        request.mandatory_keywords.join(", ")
    };

    let system = [
        "You are a professional lyric composer.".to_string(),
        format!("Write lyrics in the {} language only.", language),
        "STRUCTURE: Verse 1 (4) / Verse 2 (4) / Chorus (4) / Verse 3 (4) / Verse 4 (4) / Chorus (4)."
            .to_string(),
        "No invented words, no nonsense lines.".to_string(),
        "Keep a natural rhythm and rhyme pattern fitting the described style.".to_string(),
        format!("Include all mandatory keywords naturally: {}", keywords),
        r#"Output JSON only: {"lyrics":"...","style_en":"..."}"#.to_string(),
    ]
    .join("\n");

    let user = format!(
        "Language: {}\nStyle: {}\nVocal: {}\nBrief: {}",
        language, request.styles, request.vocal, request.brief
    );

    (system, user)
}

/// Pull the `lyrics` field out of the model's JSON answer
fn extract_lyrics(content: &str) -> Result<String, ComposeError> {
    let payload: LyricsPayload = if content.trim().is_empty() {
        LyricsPayload::default()
    } else {
        serde_json::from_str(content).unwrap_or_default()
    };
    let lyrics = payload.lyrics.trim();
    if lyrics.is_empty() {
        Err(ComposeError::Empty)
    } else {
        Ok(lyrics.to_string())
    }
}
