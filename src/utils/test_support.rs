use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::transport::HttpTransport;

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub(crate) struct ScriptedResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    /// Held back this long before the response is handed out.
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    pub(crate) fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json".to_string())],
            body: body.to_string().into_bytes(),
            delay: None,
        }
    }

    pub(crate) fn bytes(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            headers: vec![("content-type", "image/png".to_string())],
            body: body.to_vec(),
            delay: None,
        }
    }

    pub(crate) fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = Box<dyn Fn(&RecordedRequest) -> ScriptedResponse + Send + Sync>;

/// In-process transport answering every request through `handler` and
/// recording what was sent.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        handler: impl Fn(&RecordedRequest) -> ScriptedResponse + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub(crate) fn count_matching(&self, predicate: impl Fn(&RecordedRequest) -> bool) -> usize {
        self.requests().iter().filter(|req| predicate(req)).count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let recorded = RecordedRequest {
            method: request.method().clone(),
            url: request.url().to_string(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(|body| body.as_bytes())
                .and_then(|bytes| serde_json::from_slice::<Value>(bytes).ok()),
        };
        let scripted = (self.handler)(&recorded);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(recorded);
        }
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        let mut builder = http::Response::builder().status(scripted.status);
        for (name, value) in scripted.headers {
            builder = builder.header(name, value);
        }
        let response = builder
            .body(scripted.body)
            .expect("scripted response should be valid");
        Ok(reqwest::Response::from(response))
    }
}
