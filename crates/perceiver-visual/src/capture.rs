//! Screen capture boundary.

use async_trait::async_trait;
use image::DynamicImage;

use crate::errors::VisualError;

/// Supplies raw frames of the screen or target window. Platform capture
/// lives behind this trait; headless runs simply provide no source.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture(&self) -> Result<DynamicImage, VisualError>;
}
