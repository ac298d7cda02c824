use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::wavespeed_protocol::{
    Envelope, PredictionResult, RawPredictionResult, SubmittedPrediction, prediction_body,
};
use crate::error::RequestFailure;
use crate::image::ImageGenerationModel;
use crate::profile::{PollSettings, combine_headers, header_map_from_pairs};
use crate::transport::HttpTransport;
use crate::types::{ImageGenerationRequest, ImageGenerationResponse, ResponseMetadata};
use crate::utils::http::{
    MAX_ASSET_BODY_BYTES, header_pairs, send_checked_bytes, send_checked_json,
};
use crate::{Result, WaveSpeedError};

pub const MAX_IMAGES_PER_CALL: u32 = 1;

/// Source of the timestamp reported in [`ResponseMetadata`].
pub type Clock = Arc<dyn Fn() -> SystemTime + Send + Sync>;

/// Immutable configuration shared by every model a provider hands out.
#[derive(Clone)]
pub(crate) struct ImageModelConfig {
    pub provider: String,
    pub base_url: String,
    pub headers: HeaderMap,
    pub http: reqwest::Client,
    pub transport: Arc<dyn HttpTransport>,
    pub poll: PollSettings,
    pub clock: Clock,
}

impl ImageModelConfig {
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Clone)]
pub struct WaveSpeedImageModel {
    model_id: String,
    config: Arc<ImageModelConfig>,
}

impl std::fmt::Debug for WaveSpeedImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveSpeedImageModel")
            .field("provider", &self.config.provider)
            .field("model_id", &self.model_id)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

async fn cancellable<F: Future>(signal: Option<&CancellationToken>, fut: F) -> Result<F::Output> {
    match signal {
        Some(signal) => tokio::select! {
            biased;
            _ = signal.cancelled() => Err(WaveSpeedError::Cancelled),
            out = fut => Ok(out),
        },
        None => Ok(fut.await),
    }
}

impl WaveSpeedImageModel {
    pub(crate) fn new(model_id: impl Into<String>, config: Arc<ImageModelConfig>) -> Self {
        Self {
            model_id: model_id.into(),
            config,
        }
    }

    fn request_headers(&self, request: &ImageGenerationRequest) -> Result<HeaderMap> {
        let call = header_map_from_pairs(&request.headers).map_err(|err| match err {
            WaveSpeedError::InvalidConfig(message) => WaveSpeedError::InvalidRequest(message),
            other => other,
        })?;
        let mut fixed = HeaderMap::new();
        fixed.insert("prefer", HeaderValue::from_static("wait"));
        Ok(combine_headers([&self.config.headers, &call, &fixed]))
    }

    fn post_json(
        &self,
        url: String,
        headers: &HeaderMap,
        body: &Map<String, Value>,
    ) -> std::result::Result<reqwest::Request, RequestFailure> {
        Ok(self
            .config
            .http
            .post(url)
            .headers(headers.clone())
            .json(body)
            .build()?)
    }

    async fn submit(
        &self,
        headers: &HeaderMap,
        body: &Map<String, Value>,
    ) -> std::result::Result<(String, HeaderMap), RequestFailure> {
        let request = self.post_json(self.config.endpoint(&self.model_id), headers, body)?;
        let (parsed, response_headers) = send_checked_json::<Envelope<SubmittedPrediction>>(
            self.config.transport.as_ref(),
            request,
        )
        .await?;
        let id = parsed.data.id.trim().to_string();
        if id.is_empty() {
            return Err(RequestFailure::InvalidResponse(
                "prediction id is empty".to_string(),
            ));
        }
        Ok((id, response_headers))
    }

    async fn fetch_result(
        &self,
        id: &str,
        headers: &HeaderMap,
        body: &Map<String, Value>,
    ) -> std::result::Result<PredictionResult, RequestFailure> {
        let url = self.config.endpoint(&format!("predictions/{id}/result"));
        let request = self.post_json(url, headers, body)?;
        let (parsed, _) = send_checked_json::<Envelope<RawPredictionResult>>(
            self.config.transport.as_ref(),
            request,
        )
        .await?;
        PredictionResult::try_from(parsed.data).map_err(RequestFailure::InvalidResponse)
    }

    /// Polls until the prediction reaches a terminal status and returns its
    /// output URLs.
    async fn wait_for_outputs(
        &self,
        id: &str,
        headers: &HeaderMap,
        body: &Map<String, Value>,
        signal: Option<&CancellationToken>,
    ) -> Result<Vec<String>> {
        let poll = &self.config.poll;
        let started = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            let result = cancellable(signal, self.fetch_result(id, headers, body))
                .await?
                .map_err(|failure| WaveSpeedError::Poll {
                    id: id.to_string(),
                    failure,
                })?;

            match result {
                PredictionResult::Completed { urls } => {
                    tracing::debug!(prediction = id, attempts, outputs = urls.len(), "prediction completed");
                    return Ok(urls);
                }
                PredictionResult::Failed { message } => {
                    tracing::warn!(prediction = id, attempts, error = %message, "prediction failed");
                    return Err(WaveSpeedError::GenerationFailed {
                        id: id.to_string(),
                        message,
                    });
                }
                PredictionResult::Pending { status } => {
                    tracing::debug!(prediction = id, attempts, status = status.as_str(), "prediction pending");
                }
            }

            let elapsed = started.elapsed();
            let out_of_attempts = poll.max_attempts.is_some_and(|max| attempts >= max);
            let out_of_time = poll
                .max_duration()
                .is_some_and(|max| elapsed.saturating_add(poll.interval()) > max);
            if out_of_attempts || out_of_time {
                return Err(WaveSpeedError::Timeout {
                    id: id.to_string(),
                    attempts,
                    elapsed,
                });
            }

            cancellable(signal, tokio::time::sleep(poll.interval())).await?;
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let failure = |failure: RequestFailure| WaveSpeedError::Download {
            url: url.to_string(),
            failure,
        };
        let request = self
            .config
            .http
            .get(url)
            .build()
            .map_err(|err| failure(err.into()))?;
        send_checked_bytes(self.config.transport.as_ref(), request, MAX_ASSET_BODY_BYTES)
            .await
            .map_err(failure)
    }
}

#[async_trait]
impl ImageGenerationModel for WaveSpeedImageModel {
    fn provider(&self) -> &str {
        self.config.provider.as_str()
    }

    fn model_id(&self) -> &str {
        self.model_id.as_str()
    }

    fn max_images_per_call(&self) -> Option<u32> {
        Some(MAX_IMAGES_PER_CALL)
    }

    async fn generate(&self, request: ImageGenerationRequest) -> Result<ImageGenerationResponse> {
        if let Some(n) = request.n.filter(|n| *n > MAX_IMAGES_PER_CALL) {
            return Err(WaveSpeedError::InvalidRequest(format!(
                "{} generates at most {MAX_IMAGES_PER_CALL} image per call (requested {n})",
                self.config.provider
            )));
        }
        let timestamp = (self.config.clock)();
        let signal = request.abort_signal.as_ref();
        let headers = self.request_headers(&request)?;
        let body = prediction_body(&request, &self.config.provider)?;

        tracing::debug!(provider = %self.config.provider, model = %self.model_id, "submitting prediction");
        let (id, response_headers) = cancellable(signal, self.submit(&headers, &body))
            .await?
            .map_err(WaveSpeedError::Submission)?;
        tracing::info!(model = %self.model_id, prediction = %id, "prediction accepted");

        let urls = self.wait_for_outputs(&id, &headers, &body, signal).await?;

        tracing::debug!(prediction = %id, count = urls.len(), "downloading outputs");
        let images = cancellable(
            signal,
            try_join_all(urls.iter().map(|url| self.download(url))),
        )
        .await??;

        Ok(ImageGenerationResponse {
            images,
            warnings: Vec::new(),
            response: ResponseMetadata {
                timestamp,
                model_id: self.model_id.clone(),
                headers: header_pairs(&response_headers),
            },
        })
    }
}
