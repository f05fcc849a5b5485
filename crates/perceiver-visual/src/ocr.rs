//! Optional text recognition over captured frames.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::errors::VisualError;

/// One recognized text fragment with its center in frame coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextHit {
    pub text: String,
    pub cx: i32,
    pub cy: i32,
}

/// OCR boundary. No engine ships with the crate; callers plug in whatever
/// recognizer their platform provides.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, frame: &DynamicImage) -> Result<Vec<TextHit>, VisualError>;
}
