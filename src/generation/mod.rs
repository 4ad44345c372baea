//! Music generation provider client
//!
//! - `transport` - the HTTP seam (`UpstreamTransport`) and its reqwest implementation
//! - `retry` - bounded retry on overload statuses, hard timeout race
//! - `client` - two-track generation and job start on top of the two

pub mod client;
pub mod retry;
pub mod transport;

pub use client::{GeneratedTracks, GenerationClient, JobRequest, TrackRequest};
pub use retry::{is_transient_status, start_with_retry, with_timeout, RetryPolicy, StartResult};
pub use transport::{HttpTransport, UpstreamResponse, UpstreamTransport};
