//! Rate Limiting Infrastructure
//!
//! Fixed-window request counting behind a storage trait, with an
//! in-process store for single-instance deployments and tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, for `Retry-After`
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = (self.reset_at_ms - now_ms).max(0) as u64;
        remaining_ms.div_ceil(1000)
    }
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request for `key` and report whether it is within the limit
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at_ms: i64,
    count: u32,
}

/// Default ceiling on tracked clients
pub const DEFAULT_MAX_WINDOWS: usize = 100_000;

const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

/// Process-local fixed-window counter
///
/// Windows of idle clients are dropped lazily once the map grows past
/// `sweep_threshold` entries. The map never holds more than `max_windows`
/// entries: when it is full of live windows, the oldest one is evicted to
/// make room for a new client.
#[derive(Debug)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
    sweep_threshold: usize,
    max_windows: usize,
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::with_max_windows(DEFAULT_MAX_WINDOWS)
    }

    pub fn with_max_windows(max_windows: usize) -> Self {
        let max_windows = max_windows.max(1);
        Self {
            windows: Mutex::new(HashMap::new()),
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD.min(max_windows),
            max_windows,
        }
    }

    /// Number of tracked client windows
    pub fn len(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count a request at an explicit instant
    pub fn check_at(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let window_ms = config.window_ms();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() >= self.sweep_threshold {
            let before = windows.len();
            windows.retain(|_, w| now_ms - w.started_at_ms < window_ms);
            tracing::debug!(
                swept = before - windows.len(),
                remaining = windows.len(),
                "Rate limit windows swept"
            );
        }

        if windows.len() >= self.max_windows && !windows.contains_key(key) {
            let oldest = windows
                .iter()
                .min_by_key(|(_, w)| w.started_at_ms)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                windows.remove(&oldest);
                tracing::warn!(
                    max_windows = self.max_windows,
                    "Rate limit store full; evicted oldest window"
                );
            }
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at_ms: now_ms,
            count: 0,
        });

        if now_ms - window.started_at_ms >= window_ms {
            *window = Window {
                started_at_ms: now_ms,
                count: 0,
            };
        }

        let reset_at_ms = window.started_at_ms + window_ms;
        if window.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms,
            };
        }

        window.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - window.count,
            reset_at_ms,
        }
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, config, now_ms()))
    }
}

/// Current Unix time in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
