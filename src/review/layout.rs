/// Directory-depth naming for screenshot files
///
/// A screenshot's position under its root names it:
/// - `home.png` → no locale, no device
/// - `iPhone_Air/home.png` → device only
/// - `en/iPhone_Air/home.png` → locale and device
///
/// Parsing works on path segments only, with no file system access.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// Identifies one logical screenshot slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenshotKey {
    pub locale: String,
    pub device: String,
    pub screenshot_id: String,
}

impl ScreenshotKey {
    /// Build a key; empty strings mean the segment was absent.
    pub fn new(
        locale: impl Into<String>,
        device: impl Into<String>,
        screenshot_id: impl Into<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            device: device.into(),
            screenshot_id: screenshot_id.into(),
        }
    }

    /// Serialized form used by the approvals file: `locale|device|id`.
    pub fn approval_key(&self) -> String {
        format!("{}|{}|{}", self.locale, self.device, self.screenshot_id)
    }

    /// True when the screenshot sat under a device directory.
    pub fn has_device(&self) -> bool {
        !self.device.is_empty()
    }
}

impl fmt::Display for ScreenshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.approval_key())
    }
}

/// Parsed shape of a screenshot's relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathLayout {
    Flat {
        screenshot_id: String,
    },
    Device {
        device: String,
        screenshot_id: String,
    },
    Localized {
        locale: String,
        device: String,
        screenshot_id: String,
    },
}

impl PathLayout {
    /// Parse a slash- or backslash-separated relative path.
    ///
    /// Paths deeper than three segments keep their three innermost segments.
    /// Returns `None` for empty paths, traversal segments, or a file name with
    /// no stem.
    pub fn parse(relative: &str) -> Option<Self> {
        let mut segments = Vec::new();
        for segment in relative.split(&['/', '\\'][..]) {
            match segment {
                "" | "." => continue,
                ".." => return None,
                other => segments.push(other),
            }
        }
        Self::from_segments(&segments)
    }

    /// Same as [`PathLayout::parse`] for an OS path relative to a scan root.
    pub fn from_relative_path(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?),
                Component::CurDir => continue,
                _ => return None,
            }
        }
        Self::from_segments(&segments)
    }

    fn from_segments(segments: &[&str]) -> Option<Self> {
        let (file_name, dirs) = segments.split_last()?;
        let screenshot_id = file_stem(file_name)?.to_string();

        let layout = match dirs {
            [] => PathLayout::Flat { screenshot_id },
            [device] => PathLayout::Device {
                device: device.to_string(),
                screenshot_id,
            },
            [.., locale, device] => PathLayout::Localized {
                locale: locale.to_string(),
                device: device.to_string(),
                screenshot_id,
            },
        };
        Some(layout)
    }

    /// File stem of the screenshot, whatever the depth.
    pub fn screenshot_id(&self) -> &str {
        match self {
            PathLayout::Flat { screenshot_id }
            | PathLayout::Device { screenshot_id, .. }
            | PathLayout::Localized { screenshot_id, .. } => screenshot_id,
        }
    }

    /// Flatten into a key, filling absent segments with empty strings.
    pub fn into_key(self) -> ScreenshotKey {
        match self {
            PathLayout::Flat { screenshot_id } => ScreenshotKey::new("", "", screenshot_id),
            PathLayout::Device {
                device,
                screenshot_id,
            } => ScreenshotKey::new("", device, screenshot_id),
            PathLayout::Localized {
                locale,
                device,
                screenshot_id,
            } => ScreenshotKey::new(locale, device, screenshot_id),
        }
    }
}

/// File name without its final extension. Dotfiles have no stem.
fn file_stem(file_name: &str) -> Option<&str> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => file_name,
    };
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}
