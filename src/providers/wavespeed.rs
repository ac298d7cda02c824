use std::sync::Arc;
use std::time::SystemTime;

use crate::image::ImageGenerationModel;
use crate::profile::{
    Env, HttpAuth, WaveSpeedSettings, build_http_client, combine_headers, header_map_from_pairs,
    resolve_api_token, with_user_agent_suffix,
};
use crate::provider::Provider;
use crate::transport::HttpTransport;
use crate::Result;

use super::wavespeed_images::{Clock, ImageModelConfig, WaveSpeedImageModel};

pub const PROVIDER_NAME: &str = "wavespeedai";
pub const DEFAULT_BASE_URL: &str = "https://api.wavespeed.ai/api/v3";
pub const API_TOKEN_ENV: &str = "WAVESPEEDAI_API_TOKEN";

const USER_AGENT_SUFFIX: &str = concat!("wavespeedai-rs/", env!("CARGO_PKG_VERSION"));

/// Factory for WaveSpeedAI image models.
///
/// Credentials and headers are resolved once, at construction; every model
/// created afterwards shares that configuration read-only. Construction never
/// touches the network.
///
/// ```no_run
/// # async fn run() -> wavespeedai::Result<()> {
/// use wavespeedai::{ImageGenerationModel, ImageGenerationRequest, WaveSpeed};
///
/// let provider = WaveSpeed::from_env()?;
/// let model = provider.image("google/nano-banana-pro/text-to-image");
/// let response = model
///     .generate(ImageGenerationRequest::new("A detailed cat working as a cafe barista"))
///     .await?;
/// std::fs::write("cat.png", &response.images[0])?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WaveSpeed {
    config: Arc<ImageModelConfig>,
}

impl std::fmt::Debug for WaveSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveSpeed")
            .field("base_url", &self.config.base_url)
            .field("poll", &self.config.poll)
            .finish()
    }
}

impl WaveSpeed {
    pub fn new(settings: WaveSpeedSettings) -> Result<Self> {
        Self::with_env(settings, &Env::default())
    }

    /// Default settings; the token comes from `WAVESPEEDAI_API_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::new(WaveSpeedSettings::default())
    }

    pub fn with_env(settings: WaveSpeedSettings, env: &Env) -> Result<Self> {
        let env_var = settings
            .api_token_env
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(API_TOKEN_ENV);
        let token = resolve_api_token(settings.api_token.as_deref(), env, env_var)?;
        let auth = HttpAuth::bearer(&token)?;

        let mut auth_headers = reqwest::header::HeaderMap::new();
        auth_headers.insert(auth.header, auth.value);
        let custom_headers = header_map_from_pairs(&settings.http_headers)?;
        let headers = with_user_agent_suffix(
            combine_headers([&auth_headers, &custom_headers]),
            USER_AGENT_SUFFIX,
        )?;

        let base_url = settings
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let http = build_http_client(settings.request_timeout())?;
        Ok(Self {
            config: Arc::new(ImageModelConfig {
                provider: PROVIDER_NAME.to_string(),
                base_url,
                headers,
                transport: Arc::new(http.clone()),
                http,
                poll: settings.poll,
                clock: Arc::new(SystemTime::now),
            }),
        })
    }

    fn map_config(mut self, f: impl FnOnce(&mut ImageModelConfig)) -> Self {
        f(Arc::make_mut(&mut self.config));
        self
    }

    /// Sends every request through `http`, which also becomes the transport.
    pub fn with_http_client(self, http: reqwest::Client) -> Self {
        self.map_config(|config| {
            config.transport = Arc::new(http.clone());
            config.http = http;
        })
    }

    /// Routes request execution through a custom transport.
    pub fn with_transport(self, transport: Arc<dyn HttpTransport>) -> Self {
        self.map_config(|config| config.transport = transport)
    }

    pub fn with_clock(self, clock: Clock) -> Self {
        self.map_config(|config| config.clock = clock)
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }

    pub fn image(&self, model_id: impl Into<String>) -> WaveSpeedImageModel {
        WaveSpeedImageModel::new(model_id, self.config.clone())
    }

    pub fn image_model(&self, model_id: impl Into<String>) -> WaveSpeedImageModel {
        self.image(model_id)
    }
}

impl Provider for WaveSpeed {
    fn provider(&self) -> &str {
        self.config.provider.as_str()
    }

    fn image_model(&self, model_id: &str) -> Result<Arc<dyn ImageGenerationModel>> {
        Ok(Arc::new(self.image(model_id)))
    }
}
