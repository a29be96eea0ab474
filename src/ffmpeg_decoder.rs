//! FFmpeg-backed [`MediaDecoder`].
//!
//! [`FfmpegDecoder`] opens sources with `ffmpeg-next`, reads container tags
//! and the best video stream's parameters for metadata, and decodes the
//! keyframe at or before a position for thumbnails.

use std::{fs::File, slice};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input, stream::Stream},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use ffmpeg_sys_next::AVPacketSideDataType;
use image::{DynamicImage, RgbImage};

use crate::{
    decoder::{MediaDecoder, MetadataField},
    error::InspectError,
    frame::scaled_dimensions,
    path::MediaSource,
    utilities::milliseconds_to_av_timestamp,
};

/// Display matrices are nine 32-bit integers.
const DISPLAY_MATRIX_BYTES: usize = 9 * 4;

/// [`MediaDecoder`] implementation over the system FFmpeg libraries.
///
/// # Example
///
/// ```no_run
/// use vidinspect::{FfmpegDecoder, InspectorOptions, MediaInspector};
///
/// let decoder = FfmpegDecoder::new().with_scaled_frames(false);
/// let inspector = MediaInspector::new(decoder, InspectorOptions::new());
/// let info = inspector.get_media_info("input.mp4")?;
/// # Ok::<(), vidinspect::InspectError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    scaled_frames: bool,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self {
            scaled_frames: true,
        }
    }
}

impl FfmpegDecoder {
    /// A decoder that scales frames itself when given bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable size-constrained extraction in the decoder.
    ///
    /// When disabled the inspector resamples native frames instead.
    pub fn with_scaled_frames(mut self, enabled: bool) -> Self {
        self.scaled_frames = enabled;
        self
    }
}

/// An open FFmpeg demuxer bound to one source.
pub struct FfmpegHandle {
    input: Input,
    label: String,
    video_stream_index: Option<usize>,
}

impl MediaDecoder for FfmpegDecoder {
    type Handle = FfmpegHandle;

    fn open(&self, source: &MediaSource) -> Result<FfmpegHandle, InspectError> {
        let label = source.display();
        let source_error = |reason: String| InspectError::SourceOpen {
            path: label.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| source_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input = match source {
            MediaSource::LocalFile(path) => {
                // Surface permission and missing-file errors from the OS
                // rather than FFmpeg's generic demuxer message.
                File::open(path).map_err(|error| source_error(error.to_string()))?;
                ffmpeg_next::format::input(path)
            }
            MediaSource::Resolver(uri) => ffmpeg_next::format::input(uri),
        }
        .map_err(|error| source_error(error.to_string()))?;

        let video_stream_index = input
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index());

        log::debug!(
            "Opened {label} ({}), video stream {video_stream_index:?}",
            input.format().name()
        );

        Ok(FfmpegHandle {
            input,
            label,
            video_stream_index,
        })
    }

    fn extract_field(&self, handle: &mut FfmpegHandle, field: MetadataField) -> Option<String> {
        match field {
            MetadataField::Duration => {
                let microseconds = handle.input.duration();
                (microseconds > 0).then(|| (microseconds / 1_000).to_string())
            }
            MetadataField::Title => container_tag(&handle.input, &["title"]),
            MetadataField::Author => container_tag(&handle.input, &["author", "artist"]),
            MetadataField::VideoWidth => video_dimensions(handle).map(|(width, _)| width.to_string()),
            MetadataField::VideoHeight => {
                video_dimensions(handle).map(|(_, height)| height.to_string())
            }
            MetadataField::Rotation => {
                let stream = handle.input.stream(handle.video_stream_index?)?;
                rotation_tag(&stream)
                    .or_else(|| display_matrix_rotation(&stream))
                    .map(|degrees| degrees.to_string())
            }
        }
    }

    fn supports_scaled_frames(&self) -> bool {
        self.scaled_frames
    }

    fn frame_at(
        &self,
        handle: &mut FfmpegHandle,
        position_ms: i64,
        bounds: Option<(u32, u32)>,
    ) -> Result<Option<DynamicImage>, InspectError> {
        let Some(video_stream_index) = handle.video_stream_index else {
            log::debug!("{} has no video stream", handle.label);
            return Ok(None);
        };

        let mut decoder = {
            let stream = handle
                .input
                .stream(video_stream_index)
                .ok_or_else(|| InspectError::CorruptSource {
                    path: handle.label.clone(),
                    reason: format!("video stream {video_stream_index} disappeared"),
                })?;
            CodecContext::from_parameters(stream.parameters())?
                .decoder()
                .video()?
        };

        // Capping max_ts at the target lands on the keyframe at or before it.
        let timestamp = milliseconds_to_av_timestamp(position_ms);
        handle.input.seek(timestamp, ..timestamp)?;

        let mut decoded_frame = VideoFrame::empty();
        let mut found = false;

        for (stream, packet) in handle.input.packets() {
            if stream.index() != video_stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            if decoder.receive_frame(&mut decoded_frame).is_ok() {
                found = true;
                break;
            }
        }

        if !found {
            decoder.send_eof()?;
            found = decoder.receive_frame(&mut decoded_frame).is_ok();
        }

        if !found {
            log::debug!("No frame decoded from {} at {position_ms} ms", handle.label);
            return Ok(None);
        }

        let (source_width, source_height) = (decoded_frame.width(), decoded_frame.height());
        let (width, height) = match bounds {
            Some((max_width, max_height)) => scaled_dimensions(
                source_width,
                source_height,
                i32::try_from(max_width).unwrap_or(i32::MAX),
                i32::try_from(max_height).unwrap_or(i32::MAX),
            )?
            .unwrap_or((source_width, source_height)),
            None => (source_width, source_height),
        };

        let mut scaler = ScalingContext::get(
            decoded_frame.format(),
            source_width,
            source_height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;
        let mut rgb_frame = VideoFrame::empty();
        scaler.run(&decoded_frame, &mut rgb_frame)?;

        let buffer = frame_to_rgb_buffer(&rgb_frame, width, height);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            InspectError::CorruptSource {
                path: handle.label.clone(),
                reason: "decoded frame buffer does not match its dimensions".to_string(),
            }
        })?;
        Ok(Some(DynamicImage::ImageRgb8(image)))
    }

    fn close(&self, handle: FfmpegHandle) -> Result<(), InspectError> {
        log::debug!("Closing demuxer for {}", handle.label);
        drop(handle);
        Ok(())
    }
}

fn container_tag(input: &Input, keys: &[&str]) -> Option<String> {
    let tags = input.metadata();
    keys.iter()
        .find_map(|key| tags.get(key))
        .map(str::to_string)
}

fn video_dimensions(handle: &FfmpegHandle) -> Option<(u32, u32)> {
    let stream = handle.input.stream(handle.video_stream_index?)?;
    let decoder = CodecContext::from_parameters(stream.parameters())
        .ok()?
        .decoder()
        .video()
        .ok()?;
    Some((decoder.width(), decoder.height()))
}

/// Legacy `rotate` stream tag written by older muxers and FFmpeg builds.
fn rotation_tag(stream: &Stream) -> Option<i32> {
    stream
        .metadata()
        .get("rotate")
        .and_then(|value| value.trim().parse::<i32>().ok())
        .map(normalize_rotation)
}

fn display_matrix_rotation(stream: &Stream) -> Option<i32> {
    let parameters = stream.parameters();
    // SAFETY: the parameters pointer is valid for the lifetime of `stream`,
    // and FFmpeg keeps `nb_coded_side_data` entries at `coded_side_data`.
    let matrix = unsafe {
        let raw = &*parameters.as_ptr();
        if raw.coded_side_data.is_null() || raw.nb_coded_side_data <= 0 {
            return None;
        }
        let entries = slice::from_raw_parts(raw.coded_side_data, raw.nb_coded_side_data as usize);
        let entry = entries
            .iter()
            .find(|entry| entry.type_ == AVPacketSideDataType::AV_PKT_DATA_DISPLAYMATRIX)?;
        if entry.data.is_null() || entry.size < DISPLAY_MATRIX_BYTES {
            return None;
        }
        let bytes = slice::from_raw_parts(entry.data, DISPLAY_MATRIX_BYTES);
        let mut matrix = [0_i32; 9];
        for (value, chunk) in matrix.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = i32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        matrix
    };
    rotation_from_display_matrix(&matrix)
}

/// Clockwise display rotation encoded by a 16.16 fixed-point display matrix.
pub(crate) fn rotation_from_display_matrix(matrix: &[i32; 9]) -> Option<i32> {
    let fixed = |value: i32| f64::from(value) / 65_536.0;
    let scale_x = fixed(matrix[0]).hypot(fixed(matrix[3]));
    let scale_y = fixed(matrix[1]).hypot(fixed(matrix[4]));
    if scale_x == 0.0 || scale_y == 0.0 {
        return None;
    }
    let clockwise = (fixed(matrix[1]) / scale_y)
        .atan2(fixed(matrix[0]) / scale_x)
        .to_degrees()
        .round() as i32;
    Some(normalize_rotation(clockwise))
}

fn normalize_rotation(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// Copy an RGB24 frame into a tightly-packed buffer, dropping row padding.
fn frame_to_rgb_buffer(rgb_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = rgb_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    }
}
