//! Frame extraction results and scaling.
//!
//! A frame request either yields a decoded image, yields nothing (the
//! decoder had no frame at that position), or fails. Those three outcomes
//! are kept apart by [`FrameOutcome`] and [`FrameReport`]; a failure to
//! release the retriever is recorded next to them rather than over them.

use std::io::Cursor;

use image::{DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};

use crate::error::InspectError;

/// JPEG quality used when a caller does not ask for one.
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Largest scaled frame, in pixels, that will be allocated (8192 × 8192).
pub const MAX_FRAME_PIXELS: u64 = 1 << 26;

/// Parameters for one frame extraction.
///
/// Non-positive bounds mean "unconstrained" on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRequest {
    /// Position to seek to, in milliseconds.
    pub position_ms: i64,
    /// Maximum output width, ignored when `<= 0`.
    pub max_width: i32,
    /// Maximum output height, ignored when `<= 0`.
    pub max_height: i32,
}

impl FrameRequest {
    /// A request for the frame at `position_ms` at native resolution.
    pub fn at(position_ms: i64) -> Self {
        Self {
            position_ms,
            ..Self::default()
        }
    }

    /// Constrain the output to fit within `max_width` × `max_height`.
    pub fn with_bounds(mut self, max_width: i32, max_height: i32) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    /// Both bounds, when both are positive.
    pub fn both_bounds(&self) -> Option<(u32, u32)> {
        if self.max_width > 0 && self.max_height > 0 {
            Some((self.max_width as u32, self.max_height as u32))
        } else {
            None
        }
    }

    /// `true` when at least one bound is positive.
    pub fn is_bounded(&self) -> bool {
        self.max_width > 0 || self.max_height > 0
    }
}

/// What a successful decode produced.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// A decoded frame; ownership passes to the caller.
    Decoded(DynamicImage),
    /// The decoder returned no frame for this position.
    Empty,
}

impl FrameOutcome {
    /// The decoded image, if any.
    pub fn into_image(self) -> Option<DynamicImage> {
        match self {
            FrameOutcome::Decoded(image) => Some(image),
            FrameOutcome::Empty => None,
        }
    }

    /// `true` for [`FrameOutcome::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, FrameOutcome::Empty)
    }
}

/// Full account of one frame extraction.
///
/// `decode` covers opening, decoding, and scaling; `release` covers closing
/// the retriever afterwards. Release is attempted whatever `decode` holds.
#[derive(Debug)]
#[must_use]
pub struct FrameReport {
    /// Outcome of the extraction itself.
    pub decode: Result<FrameOutcome, InspectError>,
    /// Outcome of releasing the retriever.
    pub release: Result<(), InspectError>,
}

impl FrameReport {
    /// Collapse into a single result.
    ///
    /// A decode error wins over a release error. When decoding succeeded a
    /// release error is logged and the frame is still returned.
    ///
    /// # Errors
    ///
    /// Returns the decode error, if there was one.
    pub fn into_result(self) -> Result<FrameOutcome, InspectError> {
        if let Err(error) = &self.release {
            log::warn!("Ignoring failure while cleaning up: {error}");
        }
        self.decode
    }
}

/// Uniform scale ratio that fits `width` × `height` inside the bounds.
///
/// Returns `None` when neither bound is positive or the native size is
/// degenerate. With both bounds positive the smaller ratio is used so the
/// result never exceeds either bound.
pub fn scale_ratio(width: u32, height: u32, max_width: i32, max_height: i32) -> Option<f64> {
    if width == 0 || height == 0 {
        return None;
    }
    let width_ratio = f64::from(max_width) / f64::from(width);
    let height_ratio = f64::from(max_height) / f64::from(height);
    match (max_width > 0, max_height > 0) {
        (true, true) => Some(width_ratio.min(height_ratio)),
        (true, false) => Some(width_ratio),
        (false, true) => Some(height_ratio),
        (false, false) => None,
    }
}

/// Output dimensions after applying [`scale_ratio`], rounded to the nearest
/// pixel and never below 1.
///
/// `Ok(None)` means the request is unbounded and the native size stands.
///
/// # Errors
///
/// Returns [`InspectError::FrameTooLarge`] when the fitted size exceeds
/// [`MAX_FRAME_PIXELS`], before anything is allocated for it.
pub fn scaled_dimensions(
    width: u32,
    height: u32,
    max_width: i32,
    max_height: i32,
) -> Result<Option<(u32, u32)>, InspectError> {
    let Some(ratio) = scale_ratio(width, height, max_width, max_height) else {
        return Ok(None);
    };
    let scaled_width = (f64::from(width) * ratio).round().max(1.0);
    let scaled_height = (f64::from(height) * ratio).round().max(1.0);

    if scaled_width * scaled_height > MAX_FRAME_PIXELS as f64 {
        return Err(InspectError::FrameTooLarge {
            width: scaled_width as u64,
            height: scaled_height as u64,
            limit: MAX_FRAME_PIXELS,
        });
    }
    Ok(Some((scaled_width as u32, scaled_height as u32)))
}

/// Resample `frame` to fit the request's bounds with bilinear filtering.
///
/// Unbounded requests return the frame untouched.
///
/// # Errors
///
/// Returns [`InspectError::FrameTooLarge`] when the bounds would scale the
/// frame past [`MAX_FRAME_PIXELS`].
pub fn resample(
    frame: DynamicImage,
    request: &FrameRequest,
) -> Result<DynamicImage, InspectError> {
    let target = scaled_dimensions(
        frame.width(),
        frame.height(),
        request.max_width,
        request.max_height,
    )?;
    Ok(match target {
        Some((width, height)) if (width, height) != (frame.width(), frame.height()) => {
            log::debug!(
                "Resampling frame {}x{} -> {width}x{height}",
                frame.width(),
                frame.height()
            );
            frame.resize_exact(width, height, FilterType::Triangle)
        }
        _ => frame,
    })
}

/// Encode a frame as JPEG bytes.
///
/// `quality` is clamped to `1..=100`.
///
/// # Errors
///
/// Returns [`InspectError::ImageError`] if encoding fails.
pub fn encode_jpeg(frame: &DynamicImage, quality: u8) -> Result<Vec<u8>, InspectError> {
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(&frame.to_rgb8())?;
    Ok(buffer.into_inner())
}
