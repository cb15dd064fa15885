/// Review manifest model
///
/// Entries are classified from one point-in-time scan, aggregated into a
/// summary, and written as `manifest.json` next to the HTML report.
use crate::error::ReviewError;
use crate::review::approvals::ApprovalSet;
use crate::review::display::display_types_for;
use crate::review::layout::ScreenshotKey;
use crate::review::matcher::RawIndex;
use crate::review::scan::ScannedImage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Readiness of one screenshot slot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Ready,
    MissingRaw,
    InvalidSize,
    MissingAndInvalid,
}

impl ReviewStatus {
    /// Status from the two independent checks.
    ///
    /// # Arguments
    /// * `has_raw` - A raw capture matched this screenshot
    /// * `valid_size` - The framed image matches at least one App Store preset
    pub fn classify(has_raw: bool, valid_size: bool) -> Self {
        match (has_raw, valid_size) {
            (true, true) => ReviewStatus::Ready,
            (false, true) => ReviewStatus::MissingRaw,
            (true, false) => ReviewStatus::InvalidSize,
            (false, false) => ReviewStatus::MissingAndInvalid,
        }
    }

    /// Serialized form, also used as the report's CSS class.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Ready => "ready",
            ReviewStatus::MissingRaw => "missing_raw",
            ReviewStatus::InvalidSize => "invalid_size",
            ReviewStatus::MissingAndInvalid => "missing_and_invalid",
        }
    }
}

/// One screenshot slot as written to the manifest. Raw fields are empty when
/// no raw capture matched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub screenshot_id: String,
    pub locale: String,
    pub device: String,
    #[serde(default)]
    pub raw_path: String,
    #[serde(default)]
    pub raw_relative: String,
    pub framed_path: String,
    pub framed_relative: String,
    #[serde(default)]
    pub framed_width: u32,
    #[serde(default)]
    pub framed_height: u32,
    pub status: ReviewStatus,
    pub approved: bool,
    pub valid_app_store_size: bool,
    #[serde(default)]
    pub display_types: BTreeSet<String>,
}

impl ReviewEntry {
    /// Classify one framed image.
    pub fn classify(framed: &ScannedImage, raw: Option<&ScannedImage>, approved: bool) -> Self {
        let display_types = display_types_for(framed.width, framed.height);
        let valid_app_store_size = !display_types.is_empty();

        Self {
            screenshot_id: framed.key.screenshot_id.clone(),
            locale: framed.key.locale.clone(),
            device: framed.key.device.clone(),
            raw_path: raw
                .map(|r| r.path.to_string_lossy().into_owned())
                .unwrap_or_default(),
            raw_relative: raw.map(|r| r.relative.clone()).unwrap_or_default(),
            framed_path: framed.path.to_string_lossy().into_owned(),
            framed_relative: framed.relative.clone(),
            framed_width: framed.width,
            framed_height: framed.height,
            status: ReviewStatus::classify(raw.is_some(), valid_app_store_size),
            approved,
            valid_app_store_size,
            display_types,
        }
    }

    /// Key this entry was built from.
    pub fn key(&self) -> ScreenshotKey {
        ScreenshotKey::new(
            self.locale.as_str(),
            self.device.as_str(),
            self.screenshot_id.as_str(),
        )
    }

    /// True when a raw capture matched.
    pub fn has_raw(&self) -> bool {
        !self.raw_path.is_empty()
    }
}

/// Per-status entry counts; these always add up to the total.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub ready: usize,
    pub missing_raw: usize,
    pub invalid_size: usize,
    pub missing_and_invalid: usize,
}

impl StatusCounts {
    /// Sum over all statuses.
    pub fn total(&self) -> usize {
        self.ready + self.missing_raw + self.invalid_size + self.missing_and_invalid
    }
}

/// Aggregate counts.
///
/// `missing_raw` and `invalid_size` count every entry lacking a raw capture or
/// a valid size, so a `missing_and_invalid` entry counts toward both. The
/// exclusive breakdown lives in `statuses`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub ready: usize,
    pub missing_raw: usize,
    pub invalid_size: usize,
    pub approved: usize,
    pub pending_approval: usize,
    #[serde(default)]
    pub statuses: StatusCounts,
}

impl Summary {
    /// Aggregate classified entries.
    pub fn from_entries(entries: &[ReviewEntry]) -> Self {
        let mut summary = Summary {
            total: entries.len(),
            ..Summary::default()
        };

        for entry in entries {
            match entry.status {
                ReviewStatus::Ready => summary.statuses.ready += 1,
                ReviewStatus::MissingRaw => summary.statuses.missing_raw += 1,
                ReviewStatus::InvalidSize => summary.statuses.invalid_size += 1,
                ReviewStatus::MissingAndInvalid => summary.statuses.missing_and_invalid += 1,
            }
            if !entry.has_raw() {
                summary.missing_raw += 1;
            }
            if !entry.valid_app_store_size {
                summary.invalid_size += 1;
            }
            if entry.approved {
                summary.approved += 1;
            } else {
                summary.pending_approval += 1;
            }
        }
        summary.ready = summary.statuses.ready;

        summary
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewManifest {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub entries: Vec<ReviewEntry>,
}

impl ReviewManifest {
    /// Classify framed images against the raw index and approvals.
    ///
    /// Entries are ordered by (locale, device, id). A second framed file with
    /// an already-seen key is logged and dropped so keys stay unique.
    pub fn build(framed: &[ScannedImage], raw: Option<&RawIndex>, approvals: &ApprovalSet) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(framed.len());

        for image in framed {
            if !seen.insert(&image.key) {
                warn!(key = %image.key, ignored = %image.relative, "duplicate framed screenshot");
                continue;
            }
            let raw_image = raw.and_then(|index| index.lookup(&image.key).found());
            entries.push(ReviewEntry::classify(
                image,
                raw_image,
                approvals.is_approved(&image.key),
            ));
        }

        entries.sort_by(|a, b| {
            (&a.locale, &a.device, &a.screenshot_id).cmp(&(&b.locale, &b.device, &b.screenshot_id))
        });

        Self {
            generated_at: Utc::now(),
            summary: Summary::from_entries(&entries),
            entries,
        }
    }

    /// Convert to pretty JSON for the manifest file.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write pretty JSON to `path`, replacing any earlier manifest.
    pub fn write(&self, path: &Path) -> Result<(), ReviewError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ReviewError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read back a manifest written by an earlier pass.
    pub fn load(path: &Path) -> Result<Self, ReviewError> {
        let json = fs::read_to_string(path).map_err(|source| ReviewError::ReadManifest {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn image(locale: &str, device: &str, id: &str, width: u32, height: u32) -> ScannedImage {
        ScannedImage {
            key: ScreenshotKey::new(locale, device, id),
            path: PathBuf::from(format!("/shots/{locale}/{device}/{id}.png")),
            relative: format!("{locale}/{device}/{id}.png"),
            width,
            height,
        }
    }

    #[test]
    fn test_classify_truth_table() {
        assert_eq!(ReviewStatus::classify(true, true), ReviewStatus::Ready);
        assert_eq!(ReviewStatus::classify(false, true), ReviewStatus::MissingRaw);
        assert_eq!(ReviewStatus::classify(true, false), ReviewStatus::InvalidSize);
        assert_eq!(
            ReviewStatus::classify(false, false),
            ReviewStatus::MissingAndInvalid
        );
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ReviewStatus::MissingAndInvalid).unwrap();
        assert_eq!(json, "\"missing_and_invalid\"");
        assert_eq!(ReviewStatus::MissingRaw.as_str(), "missing_raw");
    }

    #[test]
    fn test_build_counts_and_order() {
        let framed = vec![
            image("fr", "iPhone_Air", "home", 1320, 2868),
            image("en", "iPhone_Air", "home", 1320, 2868),
            image("en", "iPhone_Air", "details", 1000, 1000),
            image("en", "iPhone_Air", "wide", 1000, 1000),
        ];
        let raw = RawIndex::build(vec![
            image("en", "iPhone_Air", "home", 1320, 2868),
            image("en", "iPhone_Air", "wide", 1000, 1000),
        ]);
        let approvals: ApprovalSet = vec!["en|iPhone_Air|home".to_string()].into_iter().collect();

        let manifest = ReviewManifest::build(&framed, Some(&raw), &approvals);
        let ids: Vec<_> = manifest
            .entries
            .iter()
            .map(|e| format!("{}/{}", e.locale, e.screenshot_id))
            .collect();
        assert_eq!(ids, ["en/details", "en/home", "en/wide", "fr/home"]);

        let summary = manifest.summary;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.ready, 1);
        assert_eq!(summary.missing_raw, 2);
        assert_eq!(summary.invalid_size, 2);
        assert_eq!(summary.approved, 1);
        assert_eq!(summary.pending_approval, 3);
        assert_eq!(summary.statuses.total(), summary.total);
        assert_eq!(summary.statuses.missing_and_invalid, 1);
        assert_eq!(summary.statuses.invalid_size, 1);
        assert_eq!(summary.statuses.missing_raw, 1);
    }

    #[test]
    fn test_build_drops_duplicate_framed_keys() {
        let framed = vec![
            image("en", "dev", "home", 1320, 2868),
            image("en", "dev", "home", 10, 10),
        ];
        let manifest = ReviewManifest::build(&framed, None, &ApprovalSet::default());
        assert_eq!(manifest.entries.len(), 1);
        assert!(manifest.entries[0].valid_app_store_size);
        assert_eq!(manifest.entries[0].status, ReviewStatus::MissingRaw);
    }

    #[test]
    fn test_json_shape() {
        let framed = vec![image("en", "iPhone_Air", "home", 1320, 2868)];
        let manifest = ReviewManifest::build(&framed, None, &ApprovalSet::default());
        let value: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();

        assert_eq!(value["summary"]["missing_raw"], 1);
        assert_eq!(value["summary"]["pending_approval"], 1);
        let entry = &value["entries"][0];
        assert_eq!(entry["screenshot_id"], "home");
        assert_eq!(entry["raw_path"], "");
        assert_eq!(entry["status"], "missing_raw");
        assert!(entry["display_types"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t == "APP_IPHONE_69"));
    }
}
