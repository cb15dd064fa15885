/// Watch-driven regeneration
///
/// This module handles:
/// - Extracting watched paths from the composition config (config.rs)
/// - Deciding which file system events matter (filter.rs)
/// - Collapsing bursts of triggers into at most one follow-up cycle (coalescer.rs)
/// - Invoking the composition tool (runner.rs)
///
/// A session runs one cycle at startup, then debounces qualifying events and
/// hands each quiet-period expiry to the coalescer. Cycles run on the blocking
/// pool; the select loop itself never blocks.
pub mod coalescer;
pub mod config;
pub mod filter;
pub mod runner;

pub use coalescer::{Coalescer, CoalescerState, TriggerOutcome};
pub use config::{KoubouConfig, ProjectConfig};
pub use filter::{ChangeFilter, ChangeKind};
pub use runner::{GenerationRunner, KouRunner, WatchCycleResult};

use crate::error::{GenerateError, WatchError};
use crate::review::{generate_review, ReviewRequest};
use notify::{RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub const DEBOUNCE_ENV: &str = "ASC_SHOTS_DEBOUNCE_MS";
pub const REVIEW_DIR_ENV: &str = "ASC_SHOTS_REVIEW_DIR";
pub const RAW_DIR_ENV: &str = "ASC_SHOTS_RAW_DIR";

/// Result handed to the per-cycle callback.
pub type CycleOutcome = Result<Vec<WatchCycleResult>, GenerateError>;
pub type CycleCallback = Arc<dyn Fn(&CycleOutcome) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Quiet period after the last qualifying event. Zero means the default.
    pub debounce: Duration,
    /// When set, every cycle with at least one success regenerates the review
    /// here.
    pub review_output_dir: Option<PathBuf>,
    /// Raw captures for the review; defaults to the first asset directory.
    pub review_raw_dir: Option<PathBuf>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            review_output_dir: None,
            review_raw_dir: None,
        }
    }
}

impl WatchOptions {
    /// Defaults overridden by `ASC_SHOTS_DEBOUNCE_MS`, `ASC_SHOTS_REVIEW_DIR`
    /// and `ASC_SHOTS_RAW_DIR`.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(value) = std::env::var(DEBOUNCE_ENV) {
            match value.trim().parse::<u64>() {
                Ok(ms) => options.debounce = Duration::from_millis(ms),
                Err(_) => warn!(var = DEBOUNCE_ENV, value = %value, "ignoring invalid debounce"),
            }
        }
        let dir_var = |name: &str| {
            std::env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        options.review_output_dir = dir_var(REVIEW_DIR_ENV);
        options.review_raw_dir = dir_var(RAW_DIR_ENV);

        options
    }

    /// Debounce actually used by the session; zero falls back to
    /// [`DEFAULT_DEBOUNCE`].
    pub fn effective_debounce(&self) -> Duration {
        if self.debounce.is_zero() {
            DEFAULT_DEBOUNCE
        } else {
            self.debounce
        }
    }
}

/// Everything one cycle needs, shared with the blocking pool.
struct CycleContext {
    config_path: PathBuf,
    runner: Arc<dyn GenerationRunner>,
    review: Option<ReviewRequest>,
    on_cycle: Option<CycleCallback>,
}

impl CycleContext {
    /// One generation, then the review when anything succeeded.
    fn run(&self) {
        let outcome = self.runner.run(&self.config_path);

        match &outcome {
            Err(err) => error!(error = %err, "generation failed"),
            Ok(results) => {
                for result in results {
                    if result.success {
                        info!("  ✓ {} → {}", result.name, result.path);
                    } else {
                        warn!("  ✗ {}: {}", result.name, result.error);
                    }
                }

                let any_success = results.iter().any(|r| r.success);
                match &self.review {
                    Some(request) if any_success => match generate_review(request) {
                        Ok(review) => info!(
                            "  ✓ review → {} ({} ready)",
                            review.html_path.display(),
                            review.ready
                        ),
                        Err(err) => error!(error = %err, "review failed"),
                    },
                    Some(_) => debug!("no screenshot succeeded, review skipped"),
                    None => {}
                }
            }
        }

        if let Some(callback) = &self.on_cycle {
            callback(&outcome);
        }
    }
}

/// A long-running watch over one composition config.
pub struct WatchSession {
    config_path: PathBuf,
    options: WatchOptions,
    runner: Arc<dyn GenerationRunner>,
    project: Arc<dyn ProjectConfig>,
    on_cycle: Option<CycleCallback>,
}

impl WatchSession {
    /// Session using `kou` and Koubou YAML parsing.
    pub fn new(config_path: impl Into<PathBuf>, options: WatchOptions) -> Self {
        Self {
            config_path: config_path.into(),
            options,
            runner: Arc::new(KouRunner::from_env()),
            project: Arc::new(KoubouConfig),
            on_cycle: None,
        }
    }

    /// Replace the composition tool invocation.
    pub fn with_runner(mut self, runner: Arc<dyn GenerationRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace how the config is inspected for output and asset directories.
    pub fn with_project_config(mut self, project: Arc<dyn ProjectConfig>) -> Self {
        self.project = project;
        self
    }

    /// Register a callback invoked after every cycle, including failed ones.
    ///
    /// # Arguments
    /// * `callback` - Receives the runner outcome; runs on the blocking pool after
    ///   any review regeneration
    pub fn on_cycle(mut self, callback: impl Fn(&CycleOutcome) + Send + Sync + 'static) -> Self {
        self.on_cycle = Some(Arc::new(callback));
        self
    }

    fn asset_dirs(&self, config_path: &Path) -> Vec<PathBuf> {
        let dirs = match self.project.asset_directories(config_path) {
            Ok(dirs) => dirs,
            Err(err) => {
                warn!(error = %err, "could not read asset directories; watching config only");
                Vec::new()
            }
        };
        let mut resolved: Vec<PathBuf> = Vec::with_capacity(dirs.len());
        for dir in dirs.iter().map(|d| filter::resolve_dir(d)) {
            if !resolved.contains(&dir) {
                resolved.push(dir);
            }
        }
        resolved
    }

    fn review_request(&self, config_path: &Path, asset_dirs: &[PathBuf]) -> Option<ReviewRequest> {
        let output_dir = self.options.review_output_dir.clone()?;
        let framed_dir = match self.project.output_dir(config_path) {
            Ok(Some(dir)) => dir,
            Ok(None) => {
                warn!("config has no output directory; review regeneration disabled");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "could not read output directory; review regeneration disabled");
                return None;
            }
        };
        let raw_dir = self
            .options
            .review_raw_dir
            .clone()
            .or_else(|| asset_dirs.first().cloned());

        info!(dir = %output_dir.display(), "review will regenerate after each cycle");
        Some(ReviewRequest {
            raw_dir,
            framed_dir,
            output_dir,
        })
    }

    /// Watch until `cancel` fires.
    ///
    /// Fails only during setup (missing config, watcher creation). After that,
    /// generation, review and watch errors are logged and the session keeps
    /// going. Cycles already running when cancelled are allowed to finish.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), WatchError> {
        let absolute = crate::paths::absolutize(&self.config_path);
        std::fs::metadata(&absolute).map_err(|source| WatchError::ConfigNotFound {
            path: absolute.clone(),
            source,
        })?;
        let config_path = filter::resolve_path(&absolute);
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| WatchError::ResolveConfig {
                path: config_path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent directory"),
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<notify::Event>>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .map_err(WatchError::CreateWatcher)?;
        watcher
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::AddConfigDir {
                path: config_dir.clone(),
                source,
            })?;

        let asset_dirs = self.asset_dirs(&config_path);
        for dir in asset_dirs.iter().filter(|dir| **dir != config_dir) {
            if let Err(err) = watcher.watch(dir, RecursiveMode::NonRecursive) {
                warn!(dir = %dir.display(), error = %err, "could not watch asset directory");
            }
        }

        let debounce = self.options.effective_debounce();
        info!(
            config = %config_path.display(),
            debounce_ms = debounce.as_millis() as u64,
            asset_dirs = asset_dirs.len(),
            "watching for changes"
        );

        let context = Arc::new(CycleContext {
            config_path: config_path.clone(),
            runner: Arc::clone(&self.runner),
            review: self.review_request(&config_path, &asset_dirs),
            on_cycle: self.on_cycle.clone(),
        });
        let coalescer = {
            let context = Arc::clone(&context);
            let cancel = cancel.clone();
            Arc::new(Coalescer::new(move || {
                if cancel.is_cancelled() {
                    debug!("cancelled, skipping cycle");
                    return;
                }
                context.run();
            }))
        };

        let change_filter = ChangeFilter::new(config_path, asset_dirs);

        // Initial generation so output exists before the first edit.
        let initial = Arc::clone(&coalescer);
        if let Err(err) = tokio::task::spawn_blocking(move || initial.trigger()).await {
            error!(error = %err, "initial cycle panicked");
        }

        let timer = tokio::time::sleep(debounce);
        tokio::pin!(timer);
        let mut changed: Option<PathBuf> = None;
        let mut in_flight: Vec<JoinHandle<TriggerOutcome>> = Vec::new();

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("watch cancelled");
                    break;
                }

                () = &mut timer, if changed.is_some() => {
                    if let Some(path) = changed.take() {
                        info!(path = %path.display(), "change detected");
                    }
                    in_flight.retain(|handle| !handle.is_finished());
                    let coalescer = Arc::clone(&coalescer);
                    in_flight.push(tokio::task::spawn_blocking(move || coalescer.trigger()));
                }

                event = rx.recv() => match event {
                    Some(Ok(event)) => {
                        if let Some(path) = change_filter.relevant_path(&event) {
                            debug!(path = %path.display(), "qualifying change, debouncing");
                            timer.as_mut().reset(tokio::time::Instant::now() + debounce);
                            changed = Some(path);
                        }
                    }
                    Some(Err(err)) => warn!(error = %err, "watch error"),
                    None => {
                        warn!("watch event stream closed");
                        break;
                    }
                },
            }
        }

        drop(watcher);
        for handle in in_flight {
            if let Err(err) = handle.await {
                error!(error = %err, "cycle panicked");
            }
        }
        Ok(())
    }
}
