/// Static HTML review report
///
/// One card per manifest entry with framed and raw thumbnails, identifiers,
/// size validity and approval badges. Thumbnails point at the source files via
/// `file://` URLs; nothing is copied or resized.
use crate::error::ReviewError;
use crate::review::manifest::{ReviewEntry, ReviewManifest, ReviewStatus};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use url::Url;

pub const REPORT_TITLE: &str = "ASC Shots Review";

static DRIVE_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]:/").expect("drive letter pattern is valid"));

/// URL path component for a file path.
///
/// Backslashes become slashes and Windows drive paths gain a leading `/`
/// (`C:/x` → `/C:/x`). POSIX absolute paths pass through unchanged.
pub fn path_only_url_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    if DRIVE_LETTER.is_match(&slashed) {
        format!("/{slashed}")
    } else {
        slashed
    }
}

/// Percent-encoded `file://` URL for a thumbnail, or `None` for empty paths.
pub fn thumbnail_url(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let mut url = Url::parse("file:///").ok()?;
    url.set_path(&path_only_url_path(path));
    Some(url.into())
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn status_label(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Ready => "Ready",
        ReviewStatus::MissingRaw => "Missing raw",
        ReviewStatus::InvalidSize => "Invalid size",
        ReviewStatus::MissingAndInvalid => "Missing raw + invalid size",
    }
}

const STYLE: &str = "\
body{font-family:-apple-system,BlinkMacSystemFont,sans-serif;margin:24px;background:#f5f5f7;color:#1d1d1f}
.summary{display:flex;gap:16px;margin-bottom:24px}
.summary div{background:#fff;border-radius:8px;padding:12px 16px}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(280px,1fr));gap:16px}
.card{background:#fff;border-radius:10px;padding:12px}
.card img{max-width:48%;max-height:320px;object-fit:contain;background:#eee}
.badge{display:inline-block;border-radius:4px;padding:2px 6px;margin:2px;font-size:12px}
.ready{background:#d1f5d3}.missing_raw,.invalid_size{background:#ffe7b3}.missing_and_invalid{background:#ffc9c9}
.approved{background:#cfe3ff}.pending{background:#eee}
.muted{color:#86868b;font-size:12px}";

fn render_entry(out: &mut String, entry: &ReviewEntry) {
    let title = if entry.device.is_empty() {
        escape_html(&entry.screenshot_id)
    } else {
        format!(
            "{} <span class=\"muted\">{} {}</span>",
            escape_html(&entry.screenshot_id),
            escape_html(&entry.locale),
            escape_html(&entry.device)
        )
    };
    let _ = writeln!(
        out,
        "<div class=\"card\" data-key=\"{}\">",
        escape_html(&entry.key().approval_key())
    );
    let _ = writeln!(out, "<h3>{title}</h3>");

    for (label, path) in [("framed", &entry.framed_path), ("raw", &entry.raw_path)] {
        if let Some(url) = thumbnail_url(path) {
            let _ = writeln!(
                out,
                "<img loading=\"lazy\" alt=\"{label}\" src=\"{}\">",
                escape_html(&url)
            );
        }
    }

    let _ = writeln!(
        out,
        "<div><span class=\"badge {}\">{}</span>",
        entry.status.as_str(),
        status_label(entry.status)
    );
    if entry.approved {
        let _ = writeln!(out, "<span class=\"badge approved\">Approved</span>");
    } else {
        let _ = writeln!(out, "<span class=\"badge pending\">Pending approval</span>");
    }
    let _ = writeln!(out, "</div>");

    let types = if entry.display_types.is_empty() {
        "no App Store size".to_string()
    } else {
        entry
            .display_types
            .iter()
            .map(|t| escape_html(t))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let _ = writeln!(
        out,
        "<p class=\"muted\">{}×{} · {}</p>",
        entry.framed_width, entry.framed_height, types
    );
    let _ = writeln!(
        out,
        "<p class=\"muted\">framed: {}<br>raw: {}</p>",
        escape_html(&entry.framed_relative),
        if entry.raw_relative.is_empty() {
            "none".to_string()
        } else {
            escape_html(&entry.raw_relative)
        }
    );
    let _ = writeln!(out, "</div>");
}

/// Render the full page.
pub fn render_report(manifest: &ReviewManifest) -> String {
    let summary = &manifest.summary;
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\"><head><meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{REPORT_TITLE}</title>");
    let _ = writeln!(out, "<style>{STYLE}</style></head><body>");
    let _ = writeln!(out, "<h1>{REPORT_TITLE}</h1>");
    let _ = writeln!(
        out,
        "<p class=\"muted\">Generated {}</p>",
        manifest.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "<div class=\"summary\"><div>Total {}</div><div>Ready {}</div><div>Missing raw {}</div>\
         <div>Invalid size {}</div><div>Approved {}</div><div>Pending {}</div></div>",
        summary.total,
        summary.ready,
        summary.missing_raw,
        summary.invalid_size,
        summary.approved,
        summary.pending_approval
    );

    let _ = writeln!(out, "<div class=\"grid\">");
    for entry in &manifest.entries {
        render_entry(&mut out, entry);
    }
    let _ = writeln!(out, "</div></body></html>");

    out
}

/// Render the report and write it to `path`.
///
/// # Arguments
/// * `manifest` - Classified entries and summary to render
/// * `path` - Destination file; its directory must already exist
///
/// # Returns
/// * `Ok(())` - Report written
/// * `Err(ReviewError::Write)` - The file could not be written
pub fn write_report(manifest: &ReviewManifest, path: &Path) -> Result<(), ReviewError> {
    fs::write(path, render_report(manifest)).map_err(|source| ReviewError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::approvals::ApprovalSet;
    use crate::review::layout::ScreenshotKey;
    use crate::review::scan::ScannedImage;
    use std::path::PathBuf;

    #[test]
    fn test_windows_drive_path_gets_leading_slash() {
        assert_eq!(
            path_only_url_path("C:/Users/dev/screenshots/home.png"),
            "/C:/Users/dev/screenshots/home.png"
        );
        assert_eq!(
            path_only_url_path(r"D:\shots\home.png"),
            "/D:/shots/home.png"
        );
    }

    #[test]
    fn test_unix_absolute_path_unchanged() {
        assert_eq!(
            path_only_url_path("/tmp/screenshots/home.png"),
            "/tmp/screenshots/home.png"
        );
    }

    #[test]
    fn test_thumbnail_url_percent_encodes() {
        assert_eq!(
            thumbnail_url("/tmp/my shots/home.png").as_deref(),
            Some("file:///tmp/my%20shots/home.png")
        );
        assert_eq!(thumbnail_url(""), None);
    }

    #[test]
    fn test_report_contains_title_and_escaped_entries() {
        let framed = vec![ScannedImage {
            key: ScreenshotKey::new("en", "iPhone_Air", "<home>"),
            path: PathBuf::from("/shots/en/iPhone_Air/<home>.png"),
            relative: "en/iPhone_Air/<home>.png".into(),
            width: 1320,
            height: 2868,
        }];
        let manifest = ReviewManifest::build(&framed, None, &ApprovalSet::default());
        let html = render_report(&manifest);

        assert!(html.contains("<title>ASC Shots Review</title>"));
        assert!(html.contains("&lt;home&gt;"));
        assert!(!html.contains("<home>"));
        assert!(html.contains("Missing raw"));
        assert!(html.contains("Pending approval"));
        assert!(html.contains("APP_IPHONE_69"));
    }
}
