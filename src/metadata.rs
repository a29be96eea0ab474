//! The media info record.
//!
//! [`MediaInfo`] is what
//! [`MediaInspector::get_media_info`](crate::MediaInspector::get_media_info)
//! returns. Dimensions are already corrected for display rotation.

use std::{fs, path::Path};

use serde_json::{Map, Value, json};

/// Metadata for one video, as displayed.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "ffmpeg")] {
/// use vidinspect::{FfmpegDecoder, InspectorOptions, MediaInspector};
///
/// let inspector = MediaInspector::new(FfmpegDecoder::new(), InspectorOptions::new());
/// let info = inspector.get_media_info("/sdcard/clip.mp4")?;
/// println!("{}x{} for {} ms", info.width, info.height, info.duration);
/// # }
/// # Ok::<(), vidinspect::InspectError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct MediaInfo {
    /// The path exactly as the caller supplied it.
    pub path: String,
    /// Title tag, empty if absent.
    pub title: String,
    /// Author tag, empty if absent.
    pub author: String,
    /// Displayed width in pixels.
    pub width: i64,
    /// Displayed height in pixels.
    pub height: i64,
    /// Duration in milliseconds.
    pub duration: i64,
    /// File size in bytes, 0 when the path is not a readable local file.
    pub filesize: i64,
    /// Clockwise rotation in degrees, if the decoder reported one.
    pub orientation: Option<i32>,
}

impl MediaInfo {
    /// `true` when the stored frame is displayed rotated by a quarter turn.
    pub fn is_rotated(&self) -> bool {
        self.orientation.is_some_and(is_quarter_turn)
    }

    /// Serialize into the JSON object shape used on the channel.
    ///
    /// `orientation` is left out entirely when unknown.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("path".to_string(), json!(self.path));
        object.insert("title".to_string(), json!(self.title));
        object.insert("author".to_string(), json!(self.author));
        object.insert("width".to_string(), json!(self.width));
        object.insert("height".to_string(), json!(self.height));
        object.insert("duration".to_string(), json!(self.duration));
        object.insert("filesize".to_string(), json!(self.filesize));
        if let Some(orientation) = self.orientation {
            object.insert("orientation".to_string(), json!(orientation));
        }
        Value::Object(object)
    }
}

/// Only 90 and 270 degrees transpose the displayed frame.
pub(crate) fn is_quarter_turn(orientation: i32) -> bool {
    orientation == 90 || orientation == 270
}

/// Size of `path` on disk, or 0 when it cannot be read.
pub fn file_size<P: AsRef<Path>>(path: P) -> u64 {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(error) => {
            log::debug!("No file size for {}: {error}", path.display());
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(orientation: Option<i32>) -> MediaInfo {
        MediaInfo {
            path: "/sdcard/clip.mp4".to_string(),
            title: String::new(),
            author: "someone".to_string(),
            width: 1080,
            height: 1920,
            duration: 5_000,
            filesize: 1_024,
            orientation,
        }
    }

    #[test]
    fn json_omits_missing_orientation() {
        let value = sample(None).to_json();
        assert!(value.get("orientation").is_none());
        assert_eq!(value["width"], 1080);
        assert_eq!(value["title"], "");
    }

    #[test]
    fn json_includes_orientation() {
        let value = sample(Some(90)).to_json();
        assert_eq!(value["orientation"], 90);
        assert_eq!(value["path"], "/sdcard/clip.mp4");
        assert_eq!(value["filesize"], 1_024);
    }

    #[test]
    fn quarter_turns() {
        assert!(sample(Some(90)).is_rotated());
        assert!(sample(Some(270)).is_rotated());
        assert!(!sample(Some(180)).is_rotated());
        assert!(!sample(Some(0)).is_rotated());
        assert!(!sample(None).is_rotated());
    }

    #[test]
    fn file_size_of_missing_path_is_zero() {
        assert_eq!(file_size("/definitely/not/here.mp4"), 0);
    }
}
