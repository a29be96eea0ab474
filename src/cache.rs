//! Cache directory purging.

use std::{fs, path::Path};

use walkdir::WalkDir;

use crate::config::CACHE_DIRECTORY_NAME;

/// Recursively delete the `video_compress` directory under `cache_root`.
///
/// Returns `None` when no cache root is available. Otherwise deletion walks
/// bottom-up and keeps going past entries it cannot remove; the result is
/// `Some(true)` only if everything is gone afterwards. A cache directory that
/// never existed counts as purged.
pub fn purge_cache(cache_root: Option<&Path>) -> Option<bool> {
    let directory = cache_root?.join(CACHE_DIRECTORY_NAME);
    log::debug!("Purging cache directory {}", directory.display());

    if !directory.exists() {
        return Some(true);
    }

    let mut succeeded = true;
    for entry in WalkDir::new(&directory).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                log::warn!("Could not visit cache entry: {error}");
                succeeded = false;
                continue;
            }
        };

        let path = entry.path();
        let removed = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };

        if let Err(error) = removed {
            if path.exists() {
                log::warn!("Could not delete {}: {error}", path.display());
                succeeded = false;
            }
        }
    }

    Some(succeeded)
}
