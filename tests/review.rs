use shots_review::review::{
    generate_review, generate_review_async, ReviewEntry, ReviewManifest, ReviewRequest,
    ReviewStatus, DEFAULT_APPROVALS_NAME,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    raw: PathBuf,
    framed: PathBuf,
    output: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().to_path_buf();
        Self {
            _dir: dir,
            raw: base.join("raw"),
            framed: base.join("framed"),
            output: base.join("review"),
        }
    }

    fn request(&self) -> ReviewRequest {
        ReviewRequest {
            raw_dir: Some(self.raw.clone()),
            framed_dir: self.framed.clone(),
            output_dir: self.output.clone(),
        }
    }

    fn approve(&self, keys: &[&str]) {
        fs::create_dir_all(&self.output).unwrap();
        fs::write(
            self.output.join(DEFAULT_APPROVALS_NAME),
            serde_json::to_string(keys).unwrap(),
        )
        .unwrap();
    }
}

fn write_image(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(width, height, image::Rgba([40, 90, 200, 255]))
        .save(path)
        .unwrap();
}

fn entry<'a>(manifest: &'a ReviewManifest, id: &str, locale: &str) -> &'a ReviewEntry {
    manifest
        .entries
        .iter()
        .find(|e| e.screenshot_id == id && e.locale == locale)
        .unwrap_or_else(|| panic!("entry not found for {locale}/{id}"))
}

#[test]
fn test_writes_manifest_and_html() {
    let fx = Fixture::new();
    write_image(&fx.raw.join("home.png"), 1320, 2868);
    write_image(&fx.framed.join("en/iPhone_Air/home.png"), 1320, 2868);
    write_image(&fx.framed.join("en/iPhone_Air/details.png"), 1000, 1000);
    fx.approve(&["en|iPhone_Air|home"]);

    let result = generate_review(&fx.request()).unwrap();
    assert!(result.manifest_path.exists());
    assert!(result.html_path.exists());
    assert_eq!(result.ready, 1);

    let manifest = ReviewManifest::load(&result.manifest_path).unwrap();
    let summary = manifest.summary;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.ready, 1);
    assert_eq!(summary.missing_raw, 1);
    assert_eq!(summary.invalid_size, 1);
    assert_eq!(summary.approved, 1);
    assert_eq!(summary.pending_approval, 1);
    assert_eq!(summary.statuses.total(), summary.total);

    let home = entry(&manifest, "home", "en");
    assert_eq!(home.status, ReviewStatus::Ready);
    assert!(home.approved);
    assert!(home.valid_app_store_size);
    assert!(!home.display_types.is_empty());

    let details = entry(&manifest, "details", "en");
    assert_eq!(details.status, ReviewStatus::MissingAndInvalid);
    assert!(!details.approved);
    assert!(!details.valid_app_store_size);

    let html = fs::read_to_string(&result.html_path).unwrap();
    assert!(html.contains("ASC Shots Review"));
    assert!(html.contains("home"));
}

#[test]
fn test_exact_locale_device_match_is_ready_and_approved() {
    let fx = Fixture::new();
    write_image(&fx.raw.join("en/iPhone_Air/home.png"), 1320, 2868);
    write_image(&fx.framed.join("en/iPhone_Air/home.png"), 1320, 2868);
    fx.approve(&["en|iPhone_Air|home"]);

    let result = generate_review(&fx.request()).unwrap();
    let manifest = ReviewManifest::load(&result.manifest_path).unwrap();
    let home = entry(&manifest, "home", "en");
    assert_eq!(home.status, ReviewStatus::Ready);
    assert!(home.approved);
    assert!(home.valid_app_store_size);
    assert_eq!(home.raw_relative, "en/iPhone_Air/home.png");
}

#[test]
fn test_requires_framed_directory() {
    let dir = TempDir::new().unwrap();
    let err = generate_review(&ReviewRequest {
        framed_dir: dir.path().join("missing"),
        ..ReviewRequest::default()
    })
    .unwrap_err();
    assert!(
        err.to_string().contains("read framed directory"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_matches_raw_by_locale_and_device_path() {
    let fx = Fixture::new();
    for locale in ["en", "fr"] {
        write_image(&fx.raw.join(locale).join("iPhone_Air/home.png"), 1320, 2868);
        write_image(&fx.framed.join(locale).join("iPhone_Air/home.png"), 1320, 2868);
    }

    let result = generate_review(&fx.request()).unwrap();
    let manifest = ReviewManifest::load(&result.manifest_path).unwrap();

    let en = entry(&manifest, "home", "en");
    assert_eq!(en.raw_relative, "en/iPhone_Air/home.png");
    assert_eq!(en.status, ReviewStatus::Ready);

    let fr = entry(&manifest, "home", "fr");
    assert_eq!(fr.raw_relative, "fr/iPhone_Air/home.png");
    assert_eq!(fr.status, ReviewStatus::Ready);
}

#[test]
fn test_does_not_fall_back_across_devices() {
    let fx = Fixture::new();
    write_image(&fx.raw.join("en/iPhone_17_Pro/home.png"), 1320, 2868);
    write_image(&fx.framed.join("en/iPhone_Air/home.png"), 1320, 2868);

    let result = generate_review(&fx.request()).unwrap();
    let manifest = ReviewManifest::load(&result.manifest_path).unwrap();

    let home = entry(&manifest, "home", "en");
    assert_eq!(home.device, "iPhone_Air");
    assert!(home.raw_path.is_empty() && home.raw_relative.is_empty());
    assert_eq!(home.status, ReviewStatus::MissingRaw);
}

#[test]
fn test_does_not_fall_back_when_id_is_ambiguous() {
    let fx = Fixture::new();
    for device in ["devA", "devB", "devC"] {
        write_image(&fx.raw.join(device).join("home.png"), 1320, 2868);
    }
    write_image(&fx.framed.join("home.png"), 1320, 2868);

    let result = generate_review(&fx.request()).unwrap();
    let manifest = ReviewManifest::load(&result.manifest_path).unwrap();

    let home = entry(&manifest, "home", "");
    assert!(home.raw_path.is_empty() && home.raw_relative.is_empty());
    assert_eq!(home.status, ReviewStatus::MissingRaw);
}

#[test]
fn test_without_raw_dir_everything_is_missing_raw() {
    let fx = Fixture::new();
    write_image(&fx.framed.join("iPad/home.png"), 2048, 2732);

    let result = generate_review(&ReviewRequest {
        raw_dir: None,
        ..fx.request()
    })
    .unwrap();
    assert_eq!(result.ready, 0);
    assert_eq!(result.summary.missing_raw, 1);
    assert_eq!(result.summary.statuses.missing_raw, 1);
}

#[test]
fn test_malformed_approvals_are_fatal() {
    let fx = Fixture::new();
    write_image(&fx.framed.join("home.png"), 1320, 2868);
    fs::create_dir_all(&fx.output).unwrap();
    fs::write(fx.output.join(DEFAULT_APPROVALS_NAME), "not json").unwrap();

    let err = generate_review(&ReviewRequest {
        raw_dir: None,
        ..fx.request()
    })
    .unwrap_err();
    assert!(err.to_string().contains("parse approvals"));
}

#[test]
fn test_rerun_is_idempotent() {
    let fx = Fixture::new();
    write_image(&fx.raw.join("en/iPhone_Air/home.png"), 1320, 2868);
    write_image(&fx.framed.join("en/iPhone_Air/home.png"), 1320, 2868);
    write_image(&fx.framed.join("en/iPhone_Air/details.png"), 1000, 1000);
    write_image(&fx.framed.join("de/iPhone_Air/home.png"), 1320, 2868);
    fx.approve(&["de|iPhone_Air|home"]);

    let first = generate_review(&fx.request()).unwrap();
    let first_manifest = ReviewManifest::load(&first.manifest_path).unwrap();
    let second = generate_review(&fx.request()).unwrap();
    let second_manifest = ReviewManifest::load(&second.manifest_path).unwrap();

    assert_eq!(first.summary, second.summary);
    let as_set = |m: &ReviewManifest| {
        m.entries
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect::<BTreeSet<_>>()
    };
    assert_eq!(as_set(&first_manifest), as_set(&second_manifest));
}

#[tokio::test]
async fn test_async_wrapper_matches_blocking() {
    let fx = Fixture::new();
    write_image(&fx.framed.join("home.png"), 1320, 2868);

    let result = generate_review_async(ReviewRequest {
        raw_dir: None,
        ..fx.request()
    })
    .await
    .unwrap();
    assert_eq!(result.summary.total, 1);
    assert!(result.html_path.ends_with("report.html"));
}
