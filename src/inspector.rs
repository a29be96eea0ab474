//! Core [`MediaInspector`] implementation.
//!
//! `MediaInspector` is the main entry point of the crate. Each call opens a
//! fresh [`Retriever`] on the configured decoder, asks it for metadata or one
//! frame, and releases it before returning. Nothing is cached between calls.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{
    cache,
    config::InspectorOptions,
    decoder::{MediaDecoder, MetadataField, Retriever},
    error::InspectError,
    frame::{self, FrameOutcome, FrameReport, FrameRequest},
    metadata::{self, MediaInfo},
    path::{self, MediaSource},
    utilities::parse_reported_integer,
};

/// Reads metadata and thumbnail frames through a [`MediaDecoder`].
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "ffmpeg")] {
/// use vidinspect::{FfmpegDecoder, FrameRequest, InspectorOptions, MediaInspector};
///
/// let inspector = MediaInspector::new(FfmpegDecoder::new(), InspectorOptions::new());
///
/// let info = inspector.get_media_info("/sdcard/clip.mp4")?;
/// println!("{}", info.to_json());
///
/// let request = FrameRequest::at(1_000).with_bounds(320, 320);
/// if let Some(thumbnail) = inspector.get_frame("/sdcard/clip.mp4", &request)?.into_image() {
///     thumbnail.save("thumb.png")?;
/// }
/// # }
/// # Ok::<(), vidinspect::InspectError>(())
/// ```
pub struct MediaInspector<D: MediaDecoder> {
    pub(crate) decoder: D,
    pub(crate) options: InspectorOptions,
}

impl<D: MediaDecoder> Debug for MediaInspector<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaInspector")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<D: MediaDecoder> MediaInspector<D> {
    /// Create an inspector over `decoder`.
    pub fn new(decoder: D, options: InspectorOptions) -> Self {
        Self { decoder, options }
    }

    /// The wrapped decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// The inspector's options.
    pub fn options(&self) -> &InspectorOptions {
        &self.options
    }

    /// Read the displayed metadata of a video.
    ///
    /// The source is opened through the decoder's resolver. Missing title
    /// and author become empty strings, missing numbers become 0, and a 90
    /// or 270 degree rotation swaps width and height.
    ///
    /// # Errors
    ///
    /// Returns a source error if the decoder cannot open `path`. No partial
    /// record is produced in that case.
    pub fn get_media_info(&self, path: &str) -> Result<MediaInfo, InspectError> {
        let mut retriever = Retriever::open(&self.decoder, &MediaSource::resolver(path))?;

        let duration = parse_reported_integer(retriever.field(MetadataField::Duration).as_deref());
        let title = retriever.field(MetadataField::Title).unwrap_or_default();
        let author = retriever.field(MetadataField::Author).unwrap_or_default();
        let mut width =
            parse_reported_integer(retriever.field(MetadataField::VideoWidth).as_deref());
        let mut height =
            parse_reported_integer(retriever.field(MetadataField::VideoHeight).as_deref());
        let orientation = retriever
            .field(MetadataField::Rotation)
            .and_then(|value| value.trim().parse::<i32>().ok());
        let filesize = metadata::file_size(path) as i64;

        if orientation.is_some_and(metadata::is_quarter_turn) {
            std::mem::swap(&mut width, &mut height);
        }

        if let Err(error) = retriever.release() {
            log::warn!("{error}");
        }

        Ok(MediaInfo {
            path: path.to_string(),
            title,
            author,
            width,
            height,
            duration,
            filesize,
            orientation,
        })
    }

    /// Extract one frame and report decode and release outcomes separately.
    ///
    /// Local paths (absolute or `file://`) use the decoder's local-file fast
    /// path; anything else goes through the resolver. The frame is the sync
    /// frame at or before `request.position_ms`. When the decoder supports
    /// size-constrained extraction and both bounds are positive it scales the
    /// frame itself; otherwise the native frame is resampled here.
    pub fn frame_report(&self, path: &str, request: &FrameRequest) -> FrameReport {
        let source = MediaSource::from_path(path);
        let mut retriever = match Retriever::open(&self.decoder, &source) {
            Ok(retriever) => retriever,
            Err(error) => {
                return FrameReport {
                    decode: Err(error.into_corrupt(path)),
                    release: Ok(()),
                };
            }
        };

        let decode = decode_frame(&mut retriever, request).map_err(|error| error.into_corrupt(path));
        let release = retriever.release();

        FrameReport { decode, release }
    }

    /// Extract one frame.
    ///
    /// Convenience wrapper over [`frame_report`](MediaInspector::frame_report)
    /// that gives a decode error precedence over a release error.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::CorruptSource`] if the source cannot be opened
    /// or decoded.
    pub fn get_frame(
        &self,
        path: &str,
        request: &FrameRequest,
    ) -> Result<FrameOutcome, InspectError> {
        self.frame_report(path, request).into_result()
    }

    /// GIF output name for `path`. See [`path::derive_gif_name`].
    pub fn derive_gif_name(&self, path: &str) -> String {
        path::derive_gif_name(path)
    }

    /// Purge the configured cache directory. See [`cache::purge_cache`].
    pub fn purge_cache(&self) -> Option<bool> {
        cache::purge_cache(self.options.cache_root())
    }
}

fn decode_frame<D: MediaDecoder>(
    retriever: &mut Retriever<'_, D>,
    request: &FrameRequest,
) -> Result<FrameOutcome, InspectError> {
    let prescaled = if retriever.supports_scaled_frames() {
        request.both_bounds()
    } else {
        None
    };

    let frame = match prescaled {
        Some(bounds) => retriever.frame_at(request.position_ms, Some(bounds))?,
        None => retriever
            .frame_at(request.position_ms, None)?
            .map(|frame| frame::resample(frame, request))
            .transpose()?,
    };

    Ok(match frame {
        Some(image) => FrameOutcome::Decoded(image),
        None => {
            log::debug!("Decoder returned no frame at {} ms", request.position_ms);
            FrameOutcome::Empty
        }
    })
}
