use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub(crate) const DEFAULT_MAX_POLL_DURATION: Duration = Duration::from_secs(600);
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Provider level configuration, usually built in code or read from TOML:
///
/// ```toml
/// base_url = "https://proxy.internal/wavespeed/api/v3"
/// api_token_env = "MY_WAVESPEED_TOKEN"
///
/// [http_headers]
/// x-team = "imaging"
///
/// [poll]
/// interval_ms = 500
/// max_attempts = 240
/// max_duration_ms = 120000
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSpeedSettings {
    /// Sent as `Authorization: Bearer <token>`. Falls back to the environment.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Environment variable consulted when `api_token` is unset.
    #[serde(default)]
    pub api_token_env: Option<String>,
    /// Replaces the default API prefix wholesale.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub http_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub poll: PollSettings,
}

impl std::fmt::Debug for WaveSpeedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveSpeedSettings")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("api_token_env", &self.api_token_env)
            .field("base_url", &self.base_url)
            .field("http_headers", &self.http_headers.keys().collect::<Vec<_>>())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll", &self.poll)
            .finish()
    }
}

impl WaveSpeedSettings {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }
}

/// Bounds for the prediction polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: Option<u64>,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn default_interval_ms() -> u64 {
    millis(DEFAULT_POLL_INTERVAL)
}

fn default_max_duration_ms() -> Option<u64> {
    Some(millis(DEFAULT_MAX_POLL_DURATION))
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: None,
            max_duration_ms: default_max_duration_ms(),
        }
    }
}

impl PollSettings {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_ms = millis(interval);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sub-millisecond remainders round up so a non-zero bound never becomes zero.
    pub fn with_max_duration(mut self, duration: Option<Duration>) -> Self {
        self.max_duration_ms = duration.map(|d| {
            let whole = millis(d);
            if Duration::from_millis(whole) < d {
                whole.saturating_add(1)
            } else {
                whole
            }
        });
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_ms.map(Duration::from_millis)
    }
}
