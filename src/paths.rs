//! Path resolution shared by the review pass and the watcher.
//!
//! Everything here is lexical: no symlink resolution and no file system
//! access beyond reading the current directory.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` segments without touching the file system.
///
/// A `..` at the root stays at the root; a leading `..` on a relative path is
/// kept since there is nothing to pop.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir) | Some(Component::CurDir) | None => {
                    out.push("..");
                }
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, normalized form of `path`.
///
/// # Arguments
/// * `path` - Absolute, or relative to the current working directory
///
/// # Returns
/// The joined and normalized path. If the working directory cannot be read,
/// the normalized input is returned as is.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => normalize(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_parent_segments() {
        assert_eq!(
            normalize(Path::new("/tmp/cfg/../framed")),
            PathBuf::from("/tmp/framed")
        );
        assert_eq!(
            normalize(Path::new("/tmp/./a/b/../../c")),
            PathBuf::from("/tmp/c")
        );
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_on_relative_paths() {
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_absolutize_relative() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("framed/../raw")), cwd.join("raw"));
        assert!(absolutize(Path::new("x")).is_absolute());
    }
}
