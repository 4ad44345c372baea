//! Request admission control
//!
//! Sliding-window rate limiting per key (client IP for the checkout route).
//! Window and limit are supplied by the caller on every check.

pub mod rate_limiter;
pub mod store;

pub use rate_limiter::RateLimiter;
pub use store::{InMemoryWindowStore, WindowStore};
