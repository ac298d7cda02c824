use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;
use wavespeedai::{ImageGenerationModel, ImageGenerationRequest, WaveSpeed};

#[tokio::main]
async fn main() -> wavespeedai::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wavespeedai=info")),
        )
        .init();

    let model = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "google/nano-banana-pro/text-to-image".to_string());

    let provider = WaveSpeed::from_env()?;
    let response = provider
        .image(model)
        .generate(ImageGenerationRequest::new(
            "A detailed illustration of a cat working as a barista in a cozy cafe",
        ))
        .await?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    for (index, image) in response.images.iter().enumerate() {
        let path = if index == 0 {
            format!("image-{stamp}.png")
        } else {
            format!("image-{stamp}-{index}.png")
        };
        std::fs::write(&path, image)?;
        println!("saved {path} ({} bytes)", image.len());
    }
    Ok(())
}
