//! EnZenem - custom song order intake
//!
//! Order intake service for a custom-song business: a customer brief is turned
//! into lyrics, forwarded to a third-party music generator, logged, and
//! confirmed by email.
//!
//! ## Pipeline
//! Order Brief -> Allowed/Forbidden Lexicon -> Compose -> Polish -> Sanitize
//! -> Generation job (timeout + retry) -> Order log -> Background notifications
//!
//! ## Quick Start
//!
//! ```rust
//! use enzenem::content_guard::{build_allowed_lexicon, build_forbidden_lexicon, BriefFields};
//!
//! let allowed = build_allowed_lexicon(&BriefFields {
//!     brief: "Sok dob kell bele",
//!     ..Default::default()
//! });
//! let forbidden = build_forbidden_lexicon::<&str>(&[], &allowed);
//! assert!(!forbidden.contains("dob"));
//! assert!(forbidden.contains("corporate"));
//! assert_eq!(forbidden.sanitize("corporate dob"), "dob");
//! ```

// Core error handling
pub mod error;

// Environment-driven configuration
pub mod config;

// Order brief capture and normalization
pub mod order;

// Allowed/forbidden lexicon and sanitizer
pub mod content_guard;

// Upstream generation provider: timeout, bounded retry
pub mod generation;

// Notification delivery: channel fallback and background dispatch
pub mod delivery;

// Per-key sliding window admission control
pub mod admission;

// External collaborators specified at their interface
pub mod checkout;
pub mod lyrics;
pub mod order_log;

// REST API
pub mod api;

pub use admission::{InMemoryWindowStore, RateLimiter, WindowStore};
pub use config::AppConfig;
pub use content_guard::{
    build_allowed_lexicon, build_forbidden_lexicon, contains_forbidden, sanitize, AllowedLexicon,
    BriefFields, ForbiddenLexicon,
};
pub use delivery::{
    spawn_batch, BatchReport, DeliveryChannel, DeliveryOrchestrator, DeliveryOutcome,
    DeliveryTask, FailurePolicy,
};
pub use error::{ChannelError, GenerationError, NotificationError};
pub use generation::{GenerationClient, RetryPolicy, StartResult, UpstreamTransport};
