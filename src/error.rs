use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a review pass.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Malformed request input; never retried.
    #[error("invalid review request: {0}")]
    Usage(String),

    #[error("read framed directory {}: {source}", path.display())]
    ReadFramedDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read raw directory {}: {source}", path.display())]
    ReadRawDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Approvals(#[from] ApprovalError),

    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read manifest {}: {source}", path.display())]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encode manifest: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("review task failed: {0}")]
    Join(String),
}

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("read approvals {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse approvals {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures invoking the external composition tool. Any of these aborts the
/// whole cycle.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("spawn {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("generate exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("decode generate output: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch: resolve config path {}: {source}", path.display())]
    ResolveConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("watch: config file not found {}: {source}", path.display())]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("watch: create watcher: {0}")]
    CreateWatcher(#[source] notify::Error),

    #[error("watch: add config dir {}: {source}", path.display())]
    AddConfigDir {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}
