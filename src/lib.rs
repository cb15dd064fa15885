//! Screenshot review and regeneration tooling.
//!
//! Two halves:
//! - [`review`] cross-references raw captures against framed output, classifies
//!   readiness and writes `manifest.json` plus a static `report.html`.
//! - [`watch`] observes the composition config and its asset directories and
//!   re-runs generation, coalescing bursts of edits into at most one follow-up
//!   cycle.

pub mod error;
pub mod logging;
pub mod paths;
pub mod review;
pub mod watch;

pub use error::{ApprovalError, ConfigError, GenerateError, ReviewError, WatchError};
pub use review::{
    generate_review, generate_review_async, ReviewEntry, ReviewManifest, ReviewRequest,
    ReviewResult, ReviewStatus, ScreenshotKey, Summary,
};
pub use watch::{WatchCycleResult, WatchOptions, WatchSession};
