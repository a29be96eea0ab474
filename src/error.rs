//! Error types for the `vidinspect` crate.
//!
//! [`InspectError`] is returned by every fallible operation. The variants
//! fall into two kinds that callers care about: source errors (the media
//! could not be opened or decoded) and cleanup errors (the retriever handle
//! could not be released). See [`InspectError::kind`].

use std::io::Error as IoError;

#[cfg(feature = "ffmpeg")]
use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// Coarse classification of an [`InspectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be opened, is unsupported, or is corrupt.
    Source,
    /// Releasing a retriever handle failed.
    Cleanup,
    /// Argument, parse, or local I/O failures outside the decoder.
    Other,
}

/// The unified error type for all `vidinspect` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InspectError {
    /// The decoder could not open or read the media source.
    #[error("Failed to open media source {path}: {reason}")]
    SourceOpen {
        /// The media path as given by the caller.
        path: String,
        /// Underlying reason reported by the decoder.
        reason: String,
    },

    /// The source opened but a frame could not be decoded from it.
    #[error("Assume this is a corrupt video file ({path}): {reason}")]
    CorruptSource {
        /// The media path as given by the caller.
        path: String,
        /// Underlying reason reported by the decoder.
        reason: String,
    },

    /// The retriever handle could not be released.
    #[error("Failed while cleaning up retriever for {path}: {reason}")]
    Cleanup {
        /// The media path the handle was bound to.
        path: String,
        /// Underlying reason reported by the decoder.
        reason: String,
    },

    /// Scaling a frame to the requested bounds would exceed the pixel limit.
    #[error("Scaled frame {width}x{height} exceeds the {limit} pixel limit")]
    FrameTooLarge {
        /// Requested output width.
        width: u64,
        /// Requested output height.
        height: u64,
        /// Largest allowed pixel count.
        limit: u64,
    },

    /// A textual timestamp could not be parsed.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A channel call carried a missing or malformed argument.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A channel call named a method this inspector does not implement.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while resampling or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl InspectError {
    /// Classify this error into one of the two reportable kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InspectError::SourceOpen { .. }
            | InspectError::CorruptSource { .. }
            | InspectError::FrameTooLarge { .. }
            | InspectError::FfmpegError(_) => ErrorKind::Source,
            InspectError::Cleanup { .. } => ErrorKind::Cleanup,
            _ => ErrorKind::Other,
        }
    }

    /// Re-label a source-side error as [`InspectError::CorruptSource`].
    ///
    /// Frame extraction reports every open or decode failure as a corrupt
    /// source; already-corrupt and non-source errors pass through unchanged.
    pub(crate) fn into_corrupt(self, path: &str) -> Self {
        match self {
            InspectError::SourceOpen { reason, .. } => InspectError::CorruptSource {
                path: path.to_string(),
                reason,
            },
            InspectError::FfmpegError(reason) => InspectError::CorruptSource {
                path: path.to_string(),
                reason,
            },
            error @ (InspectError::IoError(_) | InspectError::FrameTooLarge { .. }) => {
                InspectError::CorruptSource {
                    path: path.to_string(),
                    reason: error.to_string(),
                }
            }
            other => other,
        }
    }
}

#[cfg(feature = "ffmpeg")]
impl From<FfmpegError> for InspectError {
    fn from(error: FfmpegError) -> Self {
        InspectError::FfmpegError(error.to_string())
    }
}
