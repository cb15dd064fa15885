/// Externally maintained approval list
///
/// `approvals.json` is a JSON array of `locale|device|id` strings. This crate
/// only reads it; reviewers or other tools author it.
use crate::error::ApprovalError;
use crate::review::layout::ScreenshotKey;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Default file name under the review output directory.
pub const DEFAULT_APPROVALS_NAME: &str = "approvals.json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalSet {
    keys: HashSet<String>,
}

impl ApprovalSet {
    /// Whether `key`'s `locale|device|id` form appears in the list.
    pub fn is_approved(&self, key: &ScreenshotKey) -> bool {
        self.keys.contains(&key.approval_key())
    }

    /// Number of approved keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when nothing has been approved yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<String> for ApprovalSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(|k| k.trim().to_string()).collect(),
        }
    }
}

pub struct ApprovalStore;

impl ApprovalStore {
    /// Load the approval set. A missing file is an empty set.
    pub fn load(path: &Path) -> Result<ApprovalSet, ApprovalError> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ApprovalSet::default()),
            Err(source) => {
                return Err(ApprovalError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        // An empty file is treated like a missing one.
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApprovalSet::default());
        }

        let keys: Vec<String> =
            serde_json::from_slice(&data).map_err(|source| ApprovalError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(keys.into_iter().collect())
    }
}
