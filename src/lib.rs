//! WaveSpeedAI image generation behind a provider/model interface.
//!
//! [`WaveSpeed`] resolves credentials and headers once and hands out
//! [`WaveSpeedImageModel`] handles. Each `generate` call submits a prediction,
//! polls it until it completes or fails, and downloads the resulting images.

mod error;
pub mod image;
pub mod model;
mod profile;
pub mod provider;
pub mod providers;
pub mod transport;
pub mod types;
mod utils;

pub use error::{RequestFailure, Result, WaveSpeedError};
pub use image::ImageGenerationModel;
pub use model::{EmbeddingModel, LanguageModel};
pub use profile::{Env, PollSettings, WaveSpeedSettings, parse_dotenv};
pub use provider::{ModelType, Provider};
pub use providers::wavespeed::{API_TOKEN_ENV, DEFAULT_BASE_URL, PROVIDER_NAME};
pub use providers::wavespeed_images::{Clock, MAX_IMAGES_PER_CALL};
pub use providers::{WaveSpeed, WaveSpeedImageModel};
pub use transport::HttpTransport;
pub use types::{ImageGenerationRequest, ImageGenerationResponse, ResponseMetadata, Warning};

pub use tokio_util::sync::CancellationToken;
