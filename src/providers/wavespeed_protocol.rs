//! Wire types for the WaveSpeedAI prediction API.
//!
//! Responses are decoded into typed values right at the boundary; nothing
//! outside this module looks at raw JSON shapes.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::ImageGenerationRequest;
use crate::{Result, WaveSpeedError};

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// `{"data": {"id": ...}}` returned when a prediction is accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmittedPrediction {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PredictionStatus {
    Created,
    Processing,
    Completed,
    Failed,
}

impl PredictionStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// The vendor sends either a single URL or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum PredictionOutputs {
    One(String),
    Many(Vec<String>),
}

impl PredictionOutputs {
    pub(crate) fn into_urls(self) -> Vec<String> {
        match self {
            Self::One(url) => vec![url],
            Self::Many(urls) => urls,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPredictionResult {
    #[serde(default)]
    outputs: Option<PredictionOutputs>,
    status: PredictionStatus,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PredictionResult {
    Completed { urls: Vec<String> },
    Failed { message: String },
    Pending { status: PredictionStatus },
}

impl TryFrom<RawPredictionResult> for PredictionResult {
    type Error = String;

    fn try_from(raw: RawPredictionResult) -> std::result::Result<Self, Self::Error> {
        match raw.status {
            PredictionStatus::Completed => {
                let outputs = raw
                    .outputs
                    .ok_or_else(|| "completed prediction has no outputs".to_string())?;
                Ok(Self::Completed {
                    urls: outputs.into_urls(),
                })
            }
            PredictionStatus::Failed => Ok(Self::Failed {
                message: raw
                    .error
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| "prediction failed without an error message".to_string()),
            }),
            status => Ok(Self::Pending { status }),
        }
    }
}

/// Body shared by the submission and result calls. Unset optionals are
/// omitted; `wavespeedai` provider options are spread on top and win on
/// conflicting keys.
pub(crate) fn prediction_body(
    request: &ImageGenerationRequest,
    provider: &str,
) -> Result<Map<String, Value>> {
    let mut body = Map::<String, Value>::new();
    body.insert("prompt".to_string(), Value::String(request.prompt.clone()));
    if let Some(aspect_ratio) = request.aspect_ratio.as_deref() {
        body.insert(
            "aspect_ratio".to_string(),
            Value::String(aspect_ratio.to_string()),
        );
    }
    if let Some(size) = request.size.as_deref() {
        body.insert("size".to_string(), Value::String(size.to_string()));
    }
    if let Some(seed) = request.seed {
        body.insert("seed".to_string(), Value::Number(seed.into()));
    }
    if let Some(n) = request.n {
        body.insert("num_outputs".to_string(), Value::Number(n.into()));
    }

    if let Some(options) = request.provider_options_for(provider) {
        let Some(options) = options.as_object() else {
            return Err(WaveSpeedError::InvalidRequest(format!(
                "provider_options.{provider} must be a JSON object"
            )));
        };
        for (key, value) in options {
            body.insert(key.clone(), value.clone());
        }
    }
    Ok(body)
}
