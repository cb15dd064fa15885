/// File system event filtering
///
/// Only creates, writes and renames count. A qualifying path is either the
/// config file itself or an image directly inside a tracked asset directory
/// (subdirectories of an asset directory are not tracked).
use crate::review::scan::is_image_file;
use crate::paths::absolutize;
use notify::event::{EventKind, ModifyKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Rename,
}

impl ChangeKind {
    /// Map a notify event kind; `None` for kinds that never trigger a cycle.
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
                Some(ChangeKind::Write)
            }
            EventKind::Modify(ModifyKind::Metadata(_))
            | EventKind::Access(_)
            | EventKind::Remove(_)
            | EventKind::Any
            | EventKind::Other => None,
        }
    }
}

/// Resolve a path the same way for tracked targets and incoming events:
/// canonicalize the parent directory when it exists and keep the file name,
/// so renamed-away or deleted files still compare equal.
pub fn resolve_path(path: &Path) -> PathBuf {
    let absolute = absolutize(path);
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => match parent.canonicalize() {
            Ok(parent) => parent.join(name),
            Err(_) => absolute,
        },
        _ => absolute,
    }
}

/// Resolve a directory itself, falling back to its absolute form.
pub fn resolve_dir(dir: &Path) -> PathBuf {
    let absolute = absolutize(dir);
    absolute.canonicalize().unwrap_or(absolute)
}

/// The resolved config file and asset directories to compare events against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    config_path: PathBuf,
    asset_dirs: Vec<PathBuf>,
}

impl ChangeFilter {
    /// Both arguments must already be resolved with [`resolve_path`] /
    /// [`resolve_dir`].
    pub fn new(config_path: PathBuf, asset_dirs: Vec<PathBuf>) -> Self {
        Self {
            config_path,
            asset_dirs,
        }
    }

    /// Resolved config file path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Resolved asset directories, deduplicated.
    pub fn asset_dirs(&self) -> &[PathBuf] {
        &self.asset_dirs
    }

    /// Check an already-resolved event path.
    pub fn is_relevant(&self, path: &Path) -> bool {
        if path == self.config_path {
            return true;
        }
        if !is_image_file(path) {
            return false;
        }
        match path.parent() {
            Some(dir) => self.asset_dirs.iter().any(|tracked| tracked == dir),
            None => false,
        }
    }

    /// First path of a notify event that qualifies, resolved.
    pub fn relevant_path(&self, event: &notify::Event) -> Option<PathBuf> {
        ChangeKind::from_event_kind(&event.kind)?;
        event
            .paths
            .iter()
            .map(|path| resolve_path(path))
            .find(|path| self.is_relevant(path))
    }
}
