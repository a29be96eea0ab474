//! Media path handling.
//!
//! Callers hand the inspector plain strings. [`MediaSource`] decides whether
//! a string names a local file (which decoders may open directly) or must be
//! handed to the decoder's own URI resolution untouched.

use std::{
    fs,
    io::{Error as IoError, ErrorKind as IoErrorKind},
    path::{Path, PathBuf},
};

const FILE_URI_PREFIX: &str = "file://";
const GIF_SUFFIX: &str = "gif";
const DOT_GIF_SUFFIX: &str = ".gif";

/// Where a decoder should read a media resource from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A bare filesystem path, eligible for the local-file fast path.
    LocalFile(PathBuf),
    /// An opaque string resolved by the decoder (content URIs, remote
    /// schemes, or paths deliberately routed through the resolver).
    Resolver(String),
}

impl MediaSource {
    /// Normalize a raw media path.
    ///
    /// Absolute paths are used as-is, `file://` URIs lose exactly their
    /// scheme prefix, and anything else goes to the resolver unmodified.
    /// Existence is not checked here.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::PathBuf;
    ///
    /// use vidinspect::MediaSource;
    ///
    /// assert_eq!(
    ///     MediaSource::from_path("file:///tmp/x.mov"),
    ///     MediaSource::LocalFile(PathBuf::from("/tmp/x.mov")),
    /// );
    /// ```
    pub fn from_path(raw: &str) -> Self {
        if raw.starts_with('/') {
            MediaSource::LocalFile(PathBuf::from(raw))
        } else if let Some(stripped) = raw.strip_prefix(FILE_URI_PREFIX) {
            MediaSource::LocalFile(PathBuf::from(stripped))
        } else {
            MediaSource::Resolver(raw.to_string())
        }
    }

    /// Route `raw` through the decoder's resolver regardless of its form.
    pub fn resolver(raw: &str) -> Self {
        MediaSource::Resolver(raw.to_string())
    }

    /// `true` for [`MediaSource::LocalFile`].
    pub fn is_local_file(&self) -> bool {
        matches!(self, MediaSource::LocalFile(_))
    }

    /// Human-readable form for logs and error messages.
    pub fn display(&self) -> String {
        match self {
            MediaSource::LocalFile(path) => path.display().to_string(),
            MediaSource::Resolver(uri) => uri.clone(),
        }
    }
}

/// Derive the GIF output name for a source video.
///
/// Returns an empty string when `path` does not exist. Otherwise the file's
/// base name has everything after its last `.` replaced by `gif`, and a
/// `.gif` suffix is appended if the result still does not end with one
/// (names without a dot, or ending in something like `.agif`).
pub fn derive_gif_name<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if !path.exists() {
        return String::new();
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut file_name = match name.rfind('.') {
        Some(dot) => format!("{}{GIF_SUFFIX}", &name[..=dot]),
        None => name,
    };

    if !file_name.ends_with(DOT_GIF_SUFFIX) {
        file_name.push_str(DOT_GIF_SUFFIX);
    }
    file_name
}

/// Delete `path` if it exists.
///
/// Returns `Ok(true)` when a file was removed and `Ok(false)` when there was
/// nothing to remove.
pub fn delete_file<P: AsRef<Path>>(path: P) -> Result<bool, IoError> {
    match fs::remove_file(path.as_ref()) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == IoErrorKind::NotFound => Ok(false),
        Err(error) => Err(error),
    }
}
