/// Screenshot directory scanning
///
/// Walks a raw or framed tree once and records every image with its key and
/// pixel size. Each review pass scans fresh; nothing is cached.
use crate::review::layout::{PathLayout, ScreenshotKey};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions treated as screenshots, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Check the extension against [`IMAGE_EXTENSIONS`].
pub fn is_image_file(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// One image found under a scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedImage {
    pub key: ScreenshotKey,
    /// Path as walked (root joined with the relative path).
    pub path: PathBuf,
    /// Slash-separated path relative to the scan root.
    pub relative: String,
    pub width: u32,
    pub height: u32,
}

/// Recursively collect images under `root`, sorted by path.
///
/// Unreadable subdirectories are logged and skipped. An image whose header
/// cannot be decoded is kept with a 0×0 size so it still shows up as invalid.
pub fn scan_images(root: &Path) -> Vec<ScannedImage> {
    let mut images = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                None
            }
        })
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_hidden(path) || !is_image_file(path) {
            continue;
        }

        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };
        let Some(layout) = PathLayout::from_relative_path(relative_path) else {
            debug!(path = %path.display(), "path does not name a screenshot");
            continue;
        };

        let (width, height) = match image::image_dimensions(path) {
            Ok(dims) => dims,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read image size");
                (0, 0)
            }
        };

        images.push(ScannedImage {
            key: layout.into_key(),
            path: path.to_path_buf(),
            relative: to_slash(relative_path),
            width,
            height,
        });
    }

    images
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Join path components with `/` regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
