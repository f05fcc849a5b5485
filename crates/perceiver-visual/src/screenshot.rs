//! Coarse-to-fine screenshot pipeline.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use deskpilot_core_types::Rect;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::errors::VisualError;

const OVERVIEW_LONG_SIDE: u32 = 1280;
/// JPEG quality of an overview when the request did not name one.
pub const DEFAULT_OVERVIEW_QUALITY: u8 = 85;
const CROP_QUALITY: u8 = 95;
const CROP_FLOOR: i64 = 200;
const DEBUG_LONG_SIDE: u32 = 800;
const DEBUG_QUALITY: u8 = 40;

/// Encodes model-facing frames and remembers the scale of the last one.
///
/// The remembered scale is what makes crop requests meaningful: the model
/// reports coordinates against the image it saw, which may be downscaled.
pub struct VisionPipeline {
    last_scale: f64,
}

impl VisionPipeline {
    pub fn new() -> Self {
        Self { last_scale: 1.0 }
    }

    /// Scale factor of the most recently produced overview.
    pub fn last_scale(&self) -> f64 {
        self.last_scale
    }

    /// Whole-frame overview encoded at the requested JPEG quality. Frames
    /// already within the target long side are encoded as-is; larger frames
    /// are downscaled with Lanczos3 so text stays legible.
    pub fn overview(&mut self, frame: &DynamicImage, quality: u8) -> Result<Vec<u8>, VisualError> {
        let quality = quality.clamp(1, 100);
        let (w, h) = (frame.width(), frame.height());
        let long_side = w.max(h).max(1);
        let scale = (OVERVIEW_LONG_SIDE as f64 / long_side as f64).min(1.0);
        self.last_scale = scale;

        if scale >= 1.0 {
            return encode_jpeg(frame, quality);
        }

        let target_w = ((w as f64 * scale).round() as u32).max(1);
        let target_h = ((h as f64 * scale).round() as u32).max(1);
        let resized = frame.resize(target_w, target_h, FilterType::Lanczos3);
        debug!(from = %format!("{w}x{h}"), to = %format!("{target_w}x{target_h}"), scale, quality, "overview downscaled");
        encode_jpeg(&resized, quality)
    }

    /// Full-resolution crop of a region the model picked on the overview.
    ///
    /// Coordinates are divided by the last transmitted scale to map back to
    /// frame pixels. Non-positive sizes fall back to a 200x200 region; the
    /// origin is clamped into the frame and the size clamped to the frame
    /// edge. A region that is still empty after clamping is an error.
    pub fn crop(&self, frame: &DynamicImage, region: Rect) -> Result<Vec<u8>, VisualError> {
        let scale = if self.last_scale > 0.0 {
            self.last_scale
        } else {
            1.0
        };
        let mut x = (region.x as f64 / scale).round() as i64;
        let mut y = (region.y as f64 / scale).round() as i64;
        let mut width = (region.width as f64 / scale).round() as i64;
        let mut height = (region.height as f64 / scale).round() as i64;

        if width <= 0 {
            width = CROP_FLOOR;
        }
        if height <= 0 {
            height = CROP_FLOOR;
        }
        x = x.max(0);
        y = y.max(0);

        let frame_w = frame.width();
        let frame_h = frame.height();
        width = width.min(frame_w as i64 - x);
        height = height.min(frame_h as i64 - y);

        if width <= 0 || height <= 0 {
            return Err(VisualError::EmptyCrop {
                x,
                y,
                width,
                height,
                frame_w,
                frame_h,
            });
        }

        let cropped = frame.crop_imm(x as u32, y as u32, width as u32, height as u32);
        encode_jpeg(&cropped, CROP_QUALITY)
    }
}

impl Default for VisionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

pub fn to_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, VisualError> {
    let mut buf = Vec::new();
    let rgb = img.to_rgb8();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;
    Ok(buf)
}

/// Low-fidelity record of the frame, captured every step regardless of what
/// the model asked for.
pub fn debug_frame(frame: &DynamicImage) -> Result<Vec<u8>, VisualError> {
    let long_side = frame.width().max(frame.height()).max(1);
    if long_side > DEBUG_LONG_SIDE {
        let reduced = frame.resize(DEBUG_LONG_SIDE, DEBUG_LONG_SIDE, FilterType::Triangle);
        encode_jpeg(&reduced, DEBUG_QUALITY)
    } else {
        encode_jpeg(frame, DEBUG_QUALITY)
    }
}

/// Persist already-encoded image bytes on a detached task, creating parent
/// directories as needed. The task owns the buffer and logs its own
/// failures; callers never wait on it.
pub fn spawn_frame_write(bytes: Vec<u8>, path: PathBuf) {
    tokio::spawn(async move {
        if let Some(parent) = path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                warn!(dir = %parent.display(), %err, "frame dir unavailable");
                return;
            }
        }
        if let Err(err) = tokio::fs::write(&path, bytes).await {
            warn!(path = %path.display(), %err, "frame write failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;

    fn frame(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(w, h))
    }

    fn gradient(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn small_frame_keeps_scale_one() {
        let mut pipeline = VisionPipeline::new();
        let bytes = pipeline
            .overview(&frame(1000, 700), DEFAULT_OVERVIEW_QUALITY)
            .unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(pipeline.last_scale(), 1.0);
    }

    #[test]
    fn large_frame_is_downscaled() {
        let mut pipeline = VisionPipeline::new();
        pipeline
            .overview(&frame(2560, 1440), DEFAULT_OVERVIEW_QUALITY)
            .unwrap();
        assert!((pipeline.last_scale() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn requested_quality_drives_the_encoder() {
        let src = gradient(1024, 768);
        let coarse = VisionPipeline::new().overview(&src, 20).unwrap();
        let fine = VisionPipeline::new().overview(&src, 95).unwrap();
        assert!(
            fine.len() > coarse.len(),
            "q95 {} bytes vs q20 {} bytes",
            fine.len(),
            coarse.len()
        );
    }

    #[test]
    fn crop_maps_overview_coordinates_back() {
        let mut pipeline = VisionPipeline::new();
        let src = frame(2560, 1440);
        pipeline.overview(&src, DEFAULT_OVERVIEW_QUALITY).unwrap();
        // 100 on a half-scale overview lands at 200 in the source.
        let bytes = pipeline
            .crop(&src, Rect::new(100, 100, 150, 150))
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 300);
        assert_eq!(decoded.height(), 300);
    }

    #[test]
    fn crop_floors_missing_size_and_clamps_origin() {
        let mut pipeline = VisionPipeline::new();
        let src = frame(1000, 600);
        pipeline.overview(&src, DEFAULT_OVERVIEW_QUALITY).unwrap();
        let bytes = pipeline.crop(&src, Rect::new(-50, -50, 0, 0)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 200);
    }

    #[test]
    fn crop_clamps_to_frame_edge() {
        let mut pipeline = VisionPipeline::new();
        let src = frame(1000, 600);
        pipeline.overview(&src, DEFAULT_OVERVIEW_QUALITY).unwrap();
        let bytes = pipeline.crop(&src, Rect::new(900, 500, 400, 400)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 100);
        assert_eq!(decoded.height(), 100);
    }

    #[test]
    fn crop_outside_frame_is_an_error() {
        let mut pipeline = VisionPipeline::new();
        let src = frame(1000, 600);
        pipeline.overview(&src, DEFAULT_OVERVIEW_QUALITY).unwrap();
        assert!(pipeline.crop(&src, Rect::new(5000, 5000, 100, 100)).is_err());
    }
}
