/// Screenshot review pass
///
/// This module handles:
/// - Parsing screenshot keys from directory depth (layout.rs)
/// - Scanning raw and framed trees (scan.rs)
/// - Matching raw captures to framed output (matcher.rs)
/// - App Store size presets (display.rs)
/// - Reading the approval list (approvals.rs)
/// - Building and writing the manifest (manifest.rs) and HTML report (report.rs)
pub mod approvals;
pub mod display;
pub mod layout;
pub mod manifest;
pub mod matcher;
pub mod report;
pub mod scan;

pub use approvals::{ApprovalSet, ApprovalStore, DEFAULT_APPROVALS_NAME};
pub use layout::{PathLayout, ScreenshotKey};
pub use manifest::{ReviewEntry, ReviewManifest, ReviewStatus, StatusCounts, Summary};
pub use report::path_only_url_path;

use crate::error::ReviewError;
use crate::paths;
use matcher::RawIndex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const REPORT_FILE_NAME: &str = "report.html";

/// Inputs for one review pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Raw captures; without it every entry is missing its raw.
    pub raw_dir: Option<PathBuf>,
    pub framed_dir: PathBuf,
    /// Receives `manifest.json` and `report.html`; holds `approvals.json`.
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    pub manifest_path: PathBuf,
    pub html_path: PathBuf,
    pub ready: usize,
    pub summary: Summary,
}

/// Check a directory argument and return its absolute, normalized form.
///
/// Empty paths and NUL bytes are usage errors. Relative paths resolve against
/// the working directory and `..` segments are collapsed, so every path
/// written to the manifest is absolute.
fn resolve_dir(field: &str, path: &Path) -> Result<PathBuf, ReviewError> {
    if path.as_os_str().is_empty() {
        return Err(ReviewError::Usage(format!("{field} is required")));
    }
    if path.to_string_lossy().contains('\0') {
        return Err(ReviewError::Usage(format!("{field} contains a NUL byte")));
    }
    Ok(paths::absolutize(path))
}

/// Run one review pass: scan, classify, write manifest and report.
///
/// Blocking; use [`generate_review_async`] from async code.
///
/// # Arguments
/// * `request` - Raw, framed and output directories; relative paths resolve
///   against the working directory
///
/// # Returns
/// Paths of the written files and the summary, or the first fatal error
pub fn generate_review(request: &ReviewRequest) -> Result<ReviewResult, ReviewError> {
    let framed_dir = resolve_dir("framed directory", &request.framed_dir)?;
    let raw_dir = match &request.raw_dir {
        Some(dir) => Some(resolve_dir("raw directory", dir)?),
        None => None,
    };

    fs::read_dir(&framed_dir).map_err(|source| ReviewError::ReadFramedDir {
        path: framed_dir.clone(),
        source,
    })?;
    let output_dir = resolve_dir("output directory", &request.output_dir)?;

    let raw_index = match &raw_dir {
        Some(raw_dir) => {
            fs::read_dir(raw_dir).map_err(|source| ReviewError::ReadRawDir {
                path: raw_dir.clone(),
                source,
            })?;
            let index = RawIndex::build(scan::scan_images(raw_dir));
            if index.is_empty() {
                warn!(dir = %raw_dir.display(), "no raw screenshots found");
            }
            Some(index)
        }
        None => None,
    };
    let framed = scan::scan_images(&framed_dir);

    let approvals = ApprovalStore::load(&output_dir.join(DEFAULT_APPROVALS_NAME))?;
    if approvals.is_empty() {
        debug!("no approvals recorded");
    }
    let manifest = ReviewManifest::build(&framed, raw_index.as_ref(), &approvals);

    fs::create_dir_all(&output_dir).map_err(|source| ReviewError::Write {
        path: output_dir.clone(),
        source,
    })?;
    let manifest_path = output_dir.join(MANIFEST_FILE_NAME);
    let html_path = output_dir.join(REPORT_FILE_NAME);
    manifest.write(&manifest_path)?;
    report::write_report(&manifest, &html_path)?;

    let summary = manifest.summary;
    info!(
        total = summary.total,
        ready = summary.ready,
        approved = summary.approved,
        approvals = approvals.len(),
        raw = raw_index.as_ref().map_or(0, |index| index.len()),
        manifest = %manifest_path.display(),
        "review generated"
    );

    Ok(ReviewResult {
        manifest_path,
        html_path,
        ready: summary.ready,
        summary,
    })
}

/// Async wrapper around [`generate_review`]; the scan is CPU and disk bound,
/// so it runs on the blocking pool.
pub async fn generate_review_async(request: ReviewRequest) -> Result<ReviewResult, ReviewError> {
    tokio::task::spawn_blocking(move || generate_review(&request))
        .await
        .map_err(|e| ReviewError::Join(e.to_string()))?
}
