use async_trait::async_trait;

/// Executes prepared HTTP requests.
///
/// `reqwest::Client` is the default. Supply another implementation to route
/// traffic through a proxy layer, record requests, or answer them in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        reqwest::Client::execute(self, request).await
    }
}
