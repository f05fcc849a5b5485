//! Visual perception for DeskPilot.
//!
//! Screenshots travel to the decision model coarse first: a downscaled
//! overview of the whole screen, then, on request, a full-resolution crop of
//! one region. The pipeline tracks the scale factor of the last transmitted
//! image so crop coordinates reported against the overview map back to real
//! pixels.

pub mod capture;
pub mod errors;
pub mod ocr;
pub mod screenshot;

pub use capture::FrameSource;
pub use errors::VisualError;
pub use ocr::{TextHit, TextRecognizer};
pub use screenshot::{
    debug_frame, spawn_frame_write, to_base64, VisionPipeline, DEFAULT_OVERVIEW_QUALITY,
};
