use std::collections::BTreeMap;

use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::RequestFailure;
use crate::transport::HttpTransport;

const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;
const MAX_JSON_BODY_BYTES: usize = 4 * 1024 * 1024;
pub(crate) const MAX_ASSET_BODY_BYTES: usize = 64 * 1024 * 1024;

type Outcome<T> = std::result::Result<T, RequestFailure>;

async fn response_bytes_limited(
    response: reqwest::Response,
    max_bytes: usize,
) -> reqwest::Result<(Vec<u8>, bool)> {
    let max_bytes = max_bytes.max(1);
    let mut out = Vec::<u8>::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let remaining = max_bytes.saturating_sub(out.len());
        if chunk.len() > remaining {
            out.extend_from_slice(&chunk[..remaining]);
            return Ok((out, true));
        }
        out.extend_from_slice(&chunk);
    }
    Ok((out, false))
}

async fn error_body(response: reqwest::Response) -> String {
    let (bytes, truncated) = response_bytes_limited(response, MAX_ERROR_BODY_BYTES)
        .await
        .unwrap_or_default();
    let mut body = String::from_utf8_lossy(&bytes).to_string();
    if truncated {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str("...(truncated)");
    }
    body
}

async fn read_limited(response: reqwest::Response, max_bytes: usize) -> Outcome<Vec<u8>> {
    let (bytes, truncated) = response_bytes_limited(response, max_bytes).await?;
    if truncated {
        return Err(RequestFailure::InvalidResponse(format!(
            "response exceeded max bytes ({max_bytes})"
        )));
    }
    Ok(bytes)
}

pub(crate) async fn send_checked(
    transport: &dyn HttpTransport,
    request: reqwest::Request,
) -> Outcome<reqwest::Response> {
    let response = transport.execute(request).await?;
    let status = response.status();
    if !status.is_success() {
        let body = error_body(response).await;
        return Err(RequestFailure::Api { status, body });
    }
    Ok(response)
}

/// Sends `request` and decodes a JSON body, returning the response headers too.
pub(crate) async fn send_checked_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    request: reqwest::Request,
) -> Outcome<(T, HeaderMap)> {
    let response = send_checked(transport, request).await?;
    let headers = response.headers().clone();
    let bytes = read_limited(response, MAX_JSON_BODY_BYTES).await?;
    let parsed = serde_json::from_slice::<T>(&bytes).map_err(|err| {
        RequestFailure::InvalidResponse(format!(
            "{err}: {}",
            String::from_utf8_lossy(&bytes[..bytes.len().min(512)])
        ))
    })?;
    Ok((parsed, headers))
}

pub(crate) async fn send_checked_bytes(
    transport: &dyn HttpTransport,
    request: reqwest::Request,
    max_bytes: usize,
) -> Outcome<Vec<u8>> {
    let response = send_checked(transport, request).await?;
    read_limited(response, max_bytes).await
}

/// Flattens headers the way a fetch `Headers` object does: repeated values
/// are joined with `", "` and non UTF-8 bytes are replaced lossily.
pub(crate) fn header_pairs(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::<String, String>::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        out.entry(name.as_str().to_string())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    out
}
