use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::image::ImageGenerationModel;
use crate::model::{EmbeddingModel, LanguageModel};
use crate::{Result, WaveSpeedError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LanguageModel,
    EmbeddingModel,
    ImageModel,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LanguageModel => "language model",
            Self::EmbeddingModel => "embedding model",
            Self::ImageModel => "image model",
        })
    }
}

/// A vendor entry point that hands out model handles per capability.
///
/// Capabilities a vendor does not serve keep the default implementations,
/// which fail with [`WaveSpeedError::ModelNotSupported`].
pub trait Provider: Send + Sync {
    fn provider(&self) -> &str;

    fn image_model(&self, model_id: &str) -> Result<Arc<dyn ImageGenerationModel>>;

    fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>> {
        Err(not_supported(model_id, ModelType::LanguageModel))
    }

    fn embedding_model(&self, model_id: &str) -> Result<Arc<dyn EmbeddingModel>> {
        Err(not_supported(model_id, ModelType::EmbeddingModel))
    }
}

fn not_supported(model_id: &str, model_type: ModelType) -> WaveSpeedError {
    WaveSpeedError::ModelNotSupported {
        model_id: model_id.to_string(),
        model_type,
    }
}
