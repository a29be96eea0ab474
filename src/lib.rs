//! # vidinspect
//!
//! Inspect video files: read display-corrected metadata and pull single
//! thumbnail frames, through a pluggable decoder.
//!
//! `vidinspect` is a thin layer over a [`MediaDecoder`]. Every operation
//! opens one retriever handle, asks the decoder for metadata fields or one
//! decoded frame, reshapes the result, and releases the handle before it
//! returns. The default decoder is [`FfmpegDecoder`], built on
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! ## Quick Start
//!
//! ### Read Metadata
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")] {
//! use vidinspect::{FfmpegDecoder, InspectorOptions, MediaInspector};
//!
//! let inspector = MediaInspector::new(FfmpegDecoder::new(), InspectorOptions::new());
//! let info = inspector.get_media_info("/sdcard/clip.mp4").unwrap();
//! println!("{}x{}, {} ms", info.width, info.height, info.duration);
//! # }
//! ```
//!
//! ### Extract a Thumbnail
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")] {
//! use vidinspect::{FfmpegDecoder, FrameOutcome, FrameRequest, InspectorOptions, MediaInspector};
//!
//! let inspector = MediaInspector::new(FfmpegDecoder::new(), InspectorOptions::new());
//! let request = FrameRequest::at(2_000).with_bounds(320, 0);
//! match inspector.get_frame("file:///tmp/x.mov", &request).unwrap() {
//!     FrameOutcome::Decoded(image) => image.save("thumb.png").unwrap(),
//!     FrameOutcome::Empty => println!("no frame at that position"),
//! }
//! # }
//! ```
//!
//! ### Drive It Like a Plugin Channel
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")] {
//! use serde_json::json;
//! use vidinspect::{FfmpegDecoder, InspectorOptions, MediaInspector, MethodCall};
//!
//! let inspector = MediaInspector::new(FfmpegDecoder::new(), InspectorOptions::new());
//! let response = inspector.handle_call(&MethodCall::new(
//!     "getMediaInfo",
//!     json!({ "path": "/sdcard/clip.mp4" }),
//! ));
//! println!("{:?}", response.reply);
//! # }
//! ```
//!
//! ## Features
//!
//! - **Metadata** — duration, title, author, displayed dimensions (swapped
//!   for 90/270 degree rotation), file size, and rotation
//! - **Thumbnails** — the keyframe at or before a position, fitted inside
//!   optional bounds with bilinear resampling
//! - **Explicit outcomes** — a decoded frame, an empty result, and a failure
//!   are distinct; release failures never hide decode failures
//! - **Helpers** — GIF name derivation, cache purging, `HH:MM:SS.mmm`
//!   timestamp parsing
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` (default) | [`FfmpegDecoder`], FFmpeg log level control, and the `vidinspect` CLI |
//!
//! ## Requirements
//!
//! The `ffmpeg` feature needs the FFmpeg development libraries installed on
//! the system.

pub mod cache;
pub mod channel;
pub mod config;
pub mod decoder;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg_decoder;
pub mod frame;
pub mod inspector;
pub mod metadata;
pub mod path;
pub mod utilities;

pub use cache::purge_cache;
pub use channel::{ChannelError, ChannelReply, ChannelResponse, MethodCall};
pub use config::{CACHE_DIRECTORY_NAME, DEFAULT_CHANNEL_NAME, InspectorOptions};
pub use decoder::{MediaDecoder, MetadataField, Retriever};
pub use error::{ErrorKind, InspectError};
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
#[cfg(feature = "ffmpeg")]
pub use ffmpeg_decoder::{FfmpegDecoder, FfmpegHandle};
pub use frame::{FrameOutcome, FrameReport, FrameRequest};
pub use inspector::MediaInspector;
pub use metadata::MediaInfo;
pub use path::{MediaSource, delete_file, derive_gif_name};
pub use utilities::parse_timestamp;
