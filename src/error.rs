use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::provider::ModelType;

/// Why a single HTTP exchange with the vendor (or an asset host) failed.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("api error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RequestFailure {
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            Self::InvalidResponse(_) => None,
        }
    }

    /// Human readable message from a JSON error body, when the vendor sent one.
    pub fn vendor_message(&self) -> Option<String> {
        let Self::Api { body, .. } = self else {
            return None;
        };
        let value = serde_json::from_str::<Value>(body).ok()?;
        ["message", "error", "detail"]
            .iter()
            .find_map(|key| match value.get(key) {
                Some(Value::String(text)) => Some(text.clone()),
                Some(Value::Object(obj)) => obj
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum WaveSpeedError {
    #[error("missing api token: set `api_token` or the {env_var} environment variable")]
    MissingCredential { env_var: String },
    #[error("no such {model_type}: {model_id} (wavespeedai only provides image models)")]
    ModelNotSupported {
        model_id: String,
        model_type: ModelType,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("prediction submission failed: {0}")]
    Submission(#[source] RequestFailure),
    #[error("polling prediction {id} failed: {failure}")]
    Poll {
        id: String,
        #[source]
        failure: RequestFailure,
    },
    #[error("prediction {id} failed: {message}")]
    GenerationFailed { id: String, message: String },
    #[error("downloading {url} failed: {failure}")]
    Download {
        url: String,
        #[source]
        failure: RequestFailure,
    },
    #[error("prediction {id} still pending after {attempts} polls ({elapsed:?})")]
    Timeout {
        id: String,
        attempts: u32,
        elapsed: Duration,
    },
    #[error("request was cancelled")]
    Cancelled,
    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WaveSpeedError>;
