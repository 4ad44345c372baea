//! Scripted fakes for the collaborator seams

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use enzenem::checkout::{CheckoutRequest, CheckoutSessions};
use enzenem::config::GenerationConfig;
use enzenem::delivery::{ChannelAttempt, DeliveryChannel, DeliveryTask};
use enzenem::error::{ChannelError, CheckoutError, ComposeError, GenerationError};
use enzenem::generation::{UpstreamResponse, UpstreamTransport};
use enzenem::lyrics::{ComposeRequest, LyricsComposer};
use enzenem::order_log::{OrderRow, OrderSink};

// ============================================================================
// Generation transport
// ============================================================================

/// Replays canned responses in order and records when each call arrived
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<UpstreamResponse, GenerationError>>>,
    calls: Mutex<Vec<(Instant, String, Value)>>,
    delay: Option<Duration>,
    completed: AtomicBool,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<UpstreamResponse, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn statuses(statuses: &[u16], success_body: &str) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|&s| {
                    let body = if (200..300).contains(&s) {
                        success_body
                    } else {
                        "overloaded"
                    };
                    Ok(UpstreamResponse::new(s, body))
                })
                .collect(),
        )
    }

    /// Every call sleeps for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _, _)| *t).collect()
    }

    pub fn last_call(&self) -> Option<(String, Value)> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, url, body)| (url.clone(), body.clone()))
    }

    /// True once a delayed call ran to completion
    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        _headers: &[(String, String)],
        body: &Value,
    ) -> Result<UpstreamResponse, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), url.to_string(), body.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(UpstreamResponse::new(500, "script exhausted")));
        self.completed.store(true, Ordering::SeqCst);
        next
    }
}

pub fn generation_config() -> GenerationConfig {
    GenerationConfig {
        api_key: Some("suno-test".to_string()),
        base_url: "https://suno.test".to_string(),
        timeout: Duration::from_secs(45),
        max_attempts: 6,
        backoff_base: Duration::from_millis(1_500),
    }
}

// ============================================================================
// Delivery channels
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub enum Behaviour {
    Deliver,
    Unavailable,
    Fail,
    /// Panics when the recipient starts with "boom"; delivers otherwise
    PanicOnBoom,
}

pub struct FakeChannel {
    id: String,
    behaviour: Behaviour,
    delay: Option<Duration>,
    calls: AtomicUsize,
    finished: AtomicUsize,
}

impl FakeChannel {
    pub fn new(id: &str, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            behaviour,
            delay: None,
            calls: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn slow(id: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            behaviour: Behaviour::Deliver,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Attempts that have got past the simulated send delay
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryChannel for FakeChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn attempt(&self, task: &DeliveryTask) -> ChannelAttempt {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Deliver => ChannelAttempt::Delivered {
                message_id: format!("{}-{}", self.id, n),
            },
            Behaviour::Unavailable => ChannelAttempt::Unavailable {
                reason: "not configured".to_string(),
            },
            Behaviour::Fail => ChannelAttempt::Failed(ChannelError::Status {
                status: 500,
                body: "provider down".to_string(),
            }),
            Behaviour::PanicOnBoom => {
                if task.to.starts_with("boom") {
                    panic!("channel blew up");
                }
                ChannelAttempt::Delivered {
                    message_id: format!("{}-{}", self.id, n),
                }
            }
        }
    }
}

// ============================================================================
// Composer, checkout, order log
// ============================================================================

pub struct FakeComposer {
    pub lyrics: String,
    pub configured: bool,
    pub requests: Mutex<Vec<ComposeRequest>>,
}

impl FakeComposer {
    pub fn new(lyrics: &str) -> Arc<Self> {
        Arc::new(Self {
            lyrics: lyrics.to_string(),
            configured: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            lyrics: String::new(),
            configured: false,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LyricsComposer for FakeComposer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn compose(&self, request: &ComposeRequest) -> Result<String, ComposeError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.lyrics.is_empty() {
            return Err(ComposeError::Empty);
        }
        Ok(self.lyrics.clone())
    }
}

#[derive(Default)]
pub struct FakeCheckout {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CheckoutSessions for FakeCheckout {
    async fn create_session(
        &self,
        _request: &CheckoutRequest,
        return_base: &str,
    ) -> Result<String, CheckoutError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://pay.test/session/{}?return={}", n, return_base))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub rows: Mutex<Vec<OrderRow>>,
}

#[async_trait]
impl OrderSink for RecordingSink {
    async fn append_order_row(&self, row: &OrderRow) {
        self.rows.lock().unwrap().push(row.clone());
    }
}
