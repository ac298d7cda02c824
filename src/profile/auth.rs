use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

use super::env::Env;
use crate::{Result, WaveSpeedError};

#[derive(Clone)]
pub(crate) struct HttpAuth {
    pub(crate) header: HeaderName,
    pub(crate) value: HeaderValue,
}

impl std::fmt::Debug for HttpAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuth")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}

impl HttpAuth {
    pub(crate) fn bearer(token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|err| {
            WaveSpeedError::InvalidConfig(format!("api token is not a valid header value: {err}"))
        })?;
        value.set_sensitive(true);

        Ok(Self {
            header: AUTHORIZATION,
            value,
        })
    }
}

/// Explicit token first, then `env_var` through `env`.
pub(crate) fn resolve_api_token(explicit: Option<&str>, env: &Env, env_var: &str) -> Result<String> {
    if let Some(token) = explicit.map(str::trim).filter(|token| !token.is_empty()) {
        return Ok(token.to_string());
    }
    env.get(env_var)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| WaveSpeedError::MissingCredential {
            env_var: env_var.to_string(),
        })
}
