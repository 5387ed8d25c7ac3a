//! Configuration models for release pacing, callbacks and rate limiting.

pub mod engine;

pub use engine::{CallbackConfig, DispatchMode, EngineConfig, RateLimitConfig};
