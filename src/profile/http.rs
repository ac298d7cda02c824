use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::{Result, WaveSpeedError};

pub(crate) fn header_map_from_pairs(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            WaveSpeedError::InvalidConfig(format!("invalid http header name {name:?}: {err}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            WaveSpeedError::InvalidConfig(format!(
                "invalid http header value for {name:?} (value={value:?}): {err}"
            ))
        })?;
        out.insert(header_name, header_value);
    }
    Ok(out)
}

/// Merges header maps left to right; a later map replaces every value an
/// earlier map had for the same name.
pub(crate) fn combine_headers<'a>(maps: impl IntoIterator<Item = &'a HeaderMap>) -> HeaderMap {
    let mut out = HeaderMap::new();
    for map in maps {
        for name in map.keys() {
            out.remove(name);
            for value in map.get_all(name) {
                out.append(name.clone(), value.clone());
            }
        }
    }
    out
}

pub(crate) fn with_user_agent_suffix(mut headers: HeaderMap, suffix: &str) -> Result<HeaderMap> {
    let user_agent = match headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        Some(existing) => format!("{existing} {suffix}"),
        None => suffix.to_string(),
    };
    let value = HeaderValue::from_str(&user_agent).map_err(|err| {
        WaveSpeedError::InvalidConfig(format!("invalid user-agent {user_agent:?}: {err}"))
    })?;
    headers.insert(USER_AGENT, value);
    Ok(headers)
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| WaveSpeedError::InvalidConfig(format!("failed to build http client: {err}")))
}
