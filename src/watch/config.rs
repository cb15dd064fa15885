/// Composition config inspection
///
/// The watcher only needs two things from the tool's config: where framed
/// output lands and which directories hold source assets. Relative paths
/// resolve against the config file's directory.
use crate::error::ConfigError;
use crate::paths::absolutize;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub trait ProjectConfig: Send + Sync {
    /// Unique parent directories of every local asset the config references,
    /// in first-seen order.
    fn asset_directories(&self, config_path: &Path) -> Result<Vec<PathBuf>, ConfigError>;

    /// Framed output directory, if the config names one.
    fn output_dir(&self, config_path: &Path) -> Result<Option<PathBuf>, ConfigError>;
}

#[derive(Debug, Default, Deserialize)]
struct KoubouFile {
    #[serde(default)]
    project: KoubouProject,
    #[serde(default)]
    screenshots: BTreeMap<String, KoubouScreenshot>,
}

#[derive(Debug, Default, Deserialize)]
struct KoubouProject {
    #[serde(default)]
    output_dir: String,
}

#[derive(Debug, Default, Deserialize)]
struct KoubouScreenshot {
    #[serde(default)]
    content: Vec<KoubouContent>,
}

#[derive(Debug, Default, Deserialize)]
struct KoubouContent {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    asset: String,
}

/// Koubou YAML: `project.output_dir` and `screenshots.*.content[]` items of
/// `type: image`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KoubouConfig;

impl KoubouConfig {
    fn load(config_path: &Path) -> Result<KoubouFile, ConfigError> {
        let data = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        if data.trim().is_empty() {
            return Ok(KoubouFile::default());
        }
        serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }
}

/// Resolve a config value against the config's directory, collapsing `..`
/// so `../framed` names the sibling directory itself.
fn resolve(config_path: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        return absolutize(&path);
    }
    let base = config_path.parent().unwrap_or_else(|| Path::new(""));
    absolutize(&base.join(path))
}

impl ProjectConfig for KoubouConfig {
    fn asset_directories(&self, config_path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let config = Self::load(config_path)?;
        let mut seen = HashSet::new();
        let mut dirs = Vec::new();

        for screenshot in config.screenshots.values() {
            for item in &screenshot.content {
                let asset = item.asset.trim();
                if item.kind != "image" || asset.is_empty() {
                    continue;
                }
                let Some(dir) = resolve(config_path, asset).parent().map(Path::to_path_buf) else {
                    continue;
                };
                if seen.insert(dir.clone()) {
                    dirs.push(dir);
                }
            }
        }
        Ok(dirs)
    }

    fn output_dir(&self, config_path: &Path) -> Result<Option<PathBuf>, ConfigError> {
        let config = Self::load(config_path)?;
        let dir = config.project.output_dir.trim();
        if dir.is_empty() {
            return Ok(None);
        }
        Ok(Some(resolve(config_path, dir)))
    }
}
