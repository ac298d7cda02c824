use async_trait::async_trait;

use crate::Result;
use crate::types::{ImageGenerationRequest, ImageGenerationResponse};

#[async_trait]
pub trait ImageGenerationModel: Send + Sync {
    fn provider(&self) -> &str;
    fn model_id(&self) -> &str;

    /// Upper bound on `request.n` accepted by a single `generate` call.
    fn max_images_per_call(&self) -> Option<u32> {
        None
    }

    async fn generate(&self, request: ImageGenerationRequest) -> Result<ImageGenerationResponse>;
}
