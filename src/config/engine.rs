//! Engine configuration structures.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::error::AppResult;
use crate::core::RetryPolicy;

/// How the release scheduler hands released participants to the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Await each queue's callbacks before moving to the next queue.
    #[default]
    Inline,
    /// Spawn one task per queue batch; the cycle does not wait for delivery.
    Spawned,
}

/// Callback delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    /// Total attempts per callback, including the first.
    pub max_attempts: u32,
    /// Backoff after the first failure, doubled for each later one.
    pub base_delay_ms: u64,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            request_timeout_secs: 30,
        }
    }
}

impl CallbackConfig {
    /// Retry policy described by this configuration.
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

/// Inbound admission rate limiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admissions allowed per client within the window.
    pub max_requests: usize,
    /// Sliding window length.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 1_000,
            window_secs: 60,
        }
    }
}

/// Root engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Release scheduler period.
    pub release_interval_secs: u64,
    /// Expiration sweeper period.
    pub expiry_interval_secs: u64,
    /// How long an admitted participant may wait before expiring.
    pub admission_window_secs: u64,
    /// Expiry reported on simulated admissions.
    pub simulation_window_secs: u64,
    /// Waiting depth at which an operator alert is raised; 0 disables.
    pub queue_alert_threshold: usize,
    /// Callback dispatch mode.
    pub dispatch: DispatchMode,
    /// Callback delivery settings.
    pub callback: CallbackConfig,
    /// Admission rate limiting.
    pub rate_limit: RateLimitConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            release_interval_secs: 60,
            expiry_interval_secs: 60,
            admission_window_secs: 600,
            simulation_window_secs: 300,
            queue_alert_threshold: 100,
            dispatch: DispatchMode::Inline,
            callback: CallbackConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.release_interval_secs == 0 {
            return Err("release_interval_secs must be greater than 0".into());
        }
        if self.expiry_interval_secs == 0 {
            return Err("expiry_interval_secs must be greater than 0".into());
        }
        if self.admission_window_secs == 0 {
            return Err("admission_window_secs must be greater than 0".into());
        }
        if self.callback.max_attempts == 0 {
            return Err("callback.max_attempts must be greater than 0".into());
        }
        if self.callback.request_timeout_secs == 0 {
            return Err("callback.request_timeout_secs must be greater than 0".into());
        }
        if self.rate_limit.max_requests == 0 {
            return Err("rate_limit.max_requests must be greater than 0".into());
        }
        if self.rate_limit.window_secs == 0 {
            return Err("rate_limit.window_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from defaults, a `.env` file if present, and
    /// process environment overrides.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from defaults and a key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
            slot: &mut T,
        ) -> AppResult<()>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            if let Some(raw) = lookup(key) {
                *slot = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid value for {key}: {raw:?}"))?;
            }
            Ok(())
        }

        let mut cfg = Self::default();
        parse(&lookup, "WAITROOM_RELEASE_INTERVAL_SECS", &mut cfg.release_interval_secs)?;
        parse(&lookup, "WAITROOM_EXPIRY_INTERVAL_SECS", &mut cfg.expiry_interval_secs)?;
        parse(&lookup, "WAITROOM_ADMISSION_WINDOW_SECS", &mut cfg.admission_window_secs)?;
        parse(&lookup, "RATE_LIMIT_PER_MINUTE", &mut cfg.rate_limit.max_requests)?;
        parse(&lookup, "QUEUE_THRESHOLD", &mut cfg.queue_alert_threshold)?;
        parse(&lookup, "WAITROOM_CALLBACK_MAX_ATTEMPTS", &mut cfg.callback.max_attempts)?;
        parse(&lookup, "WAITROOM_CALLBACK_BASE_DELAY_MS", &mut cfg.callback.base_delay_ms)?;
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Release scheduler period.
    pub const fn release_interval(&self) -> Duration {
        Duration::from_secs(self.release_interval_secs)
    }

    /// Expiration sweeper period.
    pub const fn expiry_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_interval_secs)
    }

    /// Admission window.
    pub const fn admission_window(&self) -> Duration {
        Duration::from_secs(self.admission_window_secs)
    }

    /// Expiry window reported on simulated admissions.
    pub const fn simulation_window(&self) -> Duration {
        Duration::from_secs(self.simulation_window_secs)
    }

    /// Per-request callback timeout.
    pub const fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback.request_timeout_secs)
    }

    /// Rate limiter window.
    pub const fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit.window_secs)
    }
}
