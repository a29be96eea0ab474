//! Inspector configuration.
//!
//! [`InspectorOptions`] carries the settings that would otherwise come from
//! ambient platform lookups: the channel name used to label errors and the
//! root under which the cache directory lives.
//!
//! # Example
//!
//! ```
//! use vidinspect::InspectorOptions;
//!
//! let options = InspectorOptions::new()
//!     .with_channel_name("thumbnails")
//!     .with_cache_root("/var/cache/app");
//! assert_eq!(options.channel_name(), "thumbnails");
//! ```

use std::path::{Path, PathBuf};

/// Name of the cache directory purged by [`crate::purge_cache`].
pub const CACHE_DIRECTORY_NAME: &str = "video_compress";

/// Channel label used when none is configured.
pub const DEFAULT_CHANNEL_NAME: &str = "video_compress";

/// Settings for a [`MediaInspector`](crate::MediaInspector).
#[derive(Debug, Clone)]
pub struct InspectorOptions {
    channel_name: String,
    cache_root: Option<PathBuf>,
    jpeg_quality: u8,
}

impl Default for InspectorOptions {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            cache_root: None,
            jpeg_quality: crate::frame::DEFAULT_JPEG_QUALITY,
        }
    }
}

impl InspectorOptions {
    /// Options with the default channel name and no cache root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Label attached to errors reported over the channel.
    pub fn with_channel_name<S: Into<String>>(mut self, channel_name: S) -> Self {
        self.channel_name = channel_name.into();
        self
    }

    /// Directory that contains the `video_compress` cache directory.
    pub fn with_cache_root<P: Into<PathBuf>>(mut self, cache_root: P) -> Self {
        self.cache_root = Some(cache_root.into());
        self
    }

    /// JPEG quality for channel frame replies without an explicit `quality`.
    ///
    /// Clamped to `1..=100`.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Configured channel name.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Configured cache root, if any.
    pub fn cache_root(&self) -> Option<&Path> {
        self.cache_root.as_deref()
    }

    /// Configured default JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}
