//! The decoder capability seam.
//!
//! Everything that actually touches media bytes lives behind
//! [`MediaDecoder`]: opening a source, reading metadata fields, and producing
//! one decoded frame. The inspector only ever talks to a decoder through a
//! [`Retriever`], which owns a single handle and guarantees it is closed
//! exactly once.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use image::DynamicImage;

use crate::{error::InspectError, path::MediaSource};

/// Metadata fields the inspector asks a decoder for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    /// Total duration in milliseconds.
    Duration,
    /// Container title tag.
    Title,
    /// Container author tag.
    Author,
    /// Native (unrotated) video width in pixels.
    VideoWidth,
    /// Native (unrotated) video height in pixels.
    VideoHeight,
    /// Clockwise display rotation in degrees.
    Rotation,
}

/// A media decoding backend.
///
/// Fields are reported as strings, the way platform retrievers do, and
/// `None` means the decoder has no value for the field. Implementations must
/// tolerate any sequence of `extract_field`/`frame_at` calls on an open
/// handle; the [`Retriever`] guard makes sure none happen after `close`.
pub trait MediaDecoder {
    /// Per-source state owned by one retriever.
    type Handle;

    /// Bind a new handle to `source`.
    ///
    /// # Errors
    ///
    /// Returns a source error if the media cannot be opened.
    fn open(&self, source: &MediaSource) -> Result<Self::Handle, InspectError>;

    /// Read one metadata field.
    fn extract_field(&self, handle: &mut Self::Handle, field: MetadataField) -> Option<String>;

    /// Whether [`frame_at`](MediaDecoder::frame_at) honours `bounds`.
    ///
    /// Decoders without size-constrained extraction return `false` and the
    /// inspector resamples the native frame itself.
    fn supports_scaled_frames(&self) -> bool {
        false
    }

    /// Decode the sync frame at or before `position_ms`.
    ///
    /// When `bounds` is `Some((max_width, max_height))` the frame is scaled
    /// to fit inside those bounds, preserving aspect ratio. `Ok(None)` means
    /// the decoder produced no frame.
    ///
    /// # Errors
    ///
    /// Returns a source error if decoding fails.
    fn frame_at(
        &self,
        handle: &mut Self::Handle,
        position_ms: i64,
        bounds: Option<(u32, u32)>,
    ) -> Result<Option<DynamicImage>, InspectError>;

    /// Release a handle.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Cleanup`] if releasing fails.
    fn close(&self, handle: Self::Handle) -> Result<(), InspectError>;
}

/// Scoped ownership of one decoder handle.
///
/// The handle is closed by [`release`](Retriever::release), or by `Drop` if
/// the retriever goes out of scope first (early return, `?`, panic). Close
/// failures seen by `Drop` can only be logged.
pub struct Retriever<'d, D: MediaDecoder + ?Sized> {
    decoder: &'d D,
    handle: Option<D::Handle>,
    label: String,
}

impl<D: MediaDecoder + ?Sized> Debug for Retriever<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Retriever")
            .field("label", &self.label)
            .field("open", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

impl<'d, D: MediaDecoder + ?Sized> Retriever<'d, D> {
    /// Open `source` on `decoder`.
    ///
    /// # Errors
    ///
    /// Propagates the decoder's open error; no handle exists in that case.
    pub fn open(decoder: &'d D, source: &MediaSource) -> Result<Self, InspectError> {
        let label = source.display();
        log::debug!("Opening retriever for {label}");
        let handle = decoder.open(source)?;
        Ok(Self {
            decoder,
            handle: Some(handle),
            label,
        })
    }

    /// Read one metadata field from the bound source.
    pub fn field(&mut self, field: MetadataField) -> Option<String> {
        let handle = self.handle.as_mut()?;
        self.decoder.extract_field(handle, field)
    }

    /// Whether the underlying decoder supports pre-scaled frames.
    pub fn supports_scaled_frames(&self) -> bool {
        self.decoder.supports_scaled_frames()
    }

    /// Decode one frame. See [`MediaDecoder::frame_at`].
    ///
    /// # Errors
    ///
    /// Propagates the decoder's error.
    pub fn frame_at(
        &mut self,
        position_ms: i64,
        bounds: Option<(u32, u32)>,
    ) -> Result<Option<DynamicImage>, InspectError> {
        match self.handle.as_mut() {
            Some(handle) => self.decoder.frame_at(handle, position_ms, bounds),
            None => Ok(None),
        }
    }

    /// Close the handle now and report how that went.
    ///
    /// # Errors
    ///
    /// Returns the decoder's [`InspectError::Cleanup`] if closing fails.
    pub fn release(mut self) -> Result<(), InspectError> {
        match self.handle.take() {
            Some(handle) => {
                log::debug!("Releasing retriever for {}", self.label);
                self.decoder.close(handle)
            }
            None => Ok(()),
        }
    }
}

impl<D: MediaDecoder + ?Sized> Drop for Retriever<'_, D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(error) = self.decoder.close(handle) {
                log::warn!("Dropped retriever for {} failed to close: {error}", self.label);
            }
        }
    }
}
