/// Raw capture lookup for framed screenshots
///
/// A raw capture attaches to a framed screenshot by key. Fallbacks only drop
/// context the raw side never had; a raw stored under a different device is
/// never used, and an id that resolves to more than one raw capture is left
/// unmatched.
use crate::review::layout::ScreenshotKey;
use crate::review::scan::ScannedImage;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMatch<'a> {
    Found(&'a ScannedImage),
    /// The id exists under this many raw locations and the framed side gives
    /// no device to choose between them.
    Ambiguous(usize),
    Absent,
}

impl<'a> RawMatch<'a> {
    /// The matched capture; ambiguity counts as no match.
    pub fn found(self) -> Option<&'a ScannedImage> {
        match self {
            RawMatch::Found(image) => Some(image),
            RawMatch::Ambiguous(_) | RawMatch::Absent => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RawIndex {
    by_key: HashMap<ScreenshotKey, ScannedImage>,
    by_id: HashMap<String, Vec<ScreenshotKey>>,
}

impl RawIndex {
    /// Index scanned raw images. When two files share a key the first one
    /// (in scan order) wins.
    pub fn build(images: Vec<ScannedImage>) -> Self {
        let mut index = RawIndex::default();
        for image in images {
            if let Some(existing) = index.by_key.get(&image.key) {
                warn!(
                    key = %image.key,
                    kept = %existing.relative,
                    ignored = %image.relative,
                    "duplicate raw screenshot"
                );
                continue;
            }
            index
                .by_id
                .entry(image.key.screenshot_id.clone())
                .or_default()
                .push(image.key.clone());
            index.by_key.insert(image.key.clone(), image);
        }
        index
    }

    /// Number of distinct raw keys indexed.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// True when the raw tree held no screenshots.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Find the raw capture for a framed key.
    ///
    /// Order: exact key; same device without locale; stored flat; and, only
    /// when the framed key has no device, the id's single raw capture.
    pub fn lookup(&self, framed: &ScreenshotKey) -> RawMatch<'_> {
        if let Some(image) = self.by_key.get(framed) {
            return RawMatch::Found(image);
        }

        let id = &framed.screenshot_id;
        if framed.has_device() {
            let device_only = ScreenshotKey::new("", framed.device.as_str(), id.as_str());
            if let Some(image) = self.by_key.get(&device_only) {
                return RawMatch::Found(image);
            }
            let flat = ScreenshotKey::new("", "", id.as_str());
            if let Some(image) = self.by_key.get(&flat) {
                return RawMatch::Found(image);
            }
            return RawMatch::Absent;
        }

        match self.by_id.get(id).map(Vec::as_slice) {
            Some([only]) => self.by_key.get(only).map_or(RawMatch::Absent, RawMatch::Found),
            Some(keys) if keys.len() > 1 => RawMatch::Ambiguous(keys.len()),
            _ => RawMatch::Absent,
        }
    }
}
