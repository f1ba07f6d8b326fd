//! HTTP layer for provider API communication
//!
//! This module provides:
//! - Error classification shared by the retry loop (`classify`)
//! - Sliding-window rate limiting (`rate_limit`)
//! - Single-call execution with timeout and envelope parsing (`request`)
//! - The linear-backoff retry loop (`retry`)
//! - In-flight request coalescing (`singleflight`)

pub mod classify;
pub mod rate_limit;
pub mod request;
pub mod retry;
pub mod singleflight;

pub use classify::{classify, Classification};
pub use rate_limit::SlidingWindowLimiter;
pub use request::{ApiResponse, TaskEnvelope, PROVIDER_ERROR_THRESHOLD, PROVIDER_OK};
pub use retry::{execute_with_retry, RetryPolicy};
pub use singleflight::{CoalesceKey, SingleFlight};
