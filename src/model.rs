use async_trait::async_trait;

use crate::Result;

/// Text generation handle. No model in this crate implements it; it exists so
/// that [`crate::Provider`] can report the capability as unsupported.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &str;
    fn model_id(&self) -> &str;

    async fn generate_text(&self, prompt: String) -> Result<String>;
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    fn provider(&self) -> &str;
    fn model_id(&self) -> &str;

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}
