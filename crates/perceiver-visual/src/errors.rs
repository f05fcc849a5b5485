use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisualError {
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("crop region empty after clamping: {x},{y} {width}x{height} in {frame_w}x{frame_h}")]
    EmptyCrop {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        frame_w: u32,
        frame_h: u32,
    },

    #[error("screen capture failed: {0}")]
    Capture(String),
}
