pub mod wavespeed;
pub mod wavespeed_images;
mod wavespeed_protocol;

pub use wavespeed::WaveSpeed;
pub use wavespeed_images::WaveSpeedImageModel;
