/// External composition tool invocation
///
/// The tool renders every screenshot named by a config and reports one result
/// per item. Only a process-level failure is an error; individual item
/// failures come back inside the results.
use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Env var overriding the composition tool binary.
pub const KOU_BIN_ENV: &str = "ASC_SHOTS_KOU_BIN";
const DEFAULT_KOU_BIN: &str = "kou";

/// Outcome for one screenshot produced in a generation cycle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WatchCycleResult {
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Runs one generation for a config file.
pub trait GenerationRunner: Send + Sync {
    fn run(&self, config_path: &Path) -> Result<Vec<WatchCycleResult>, GenerateError>;
}

/// Invokes `kou generate <config> --output json`.
#[derive(Debug, Clone)]
pub struct KouRunner {
    program: PathBuf,
}

impl KouRunner {
    /// Runner for an explicit binary path or name on `PATH`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Binary from `ASC_SHOTS_KOU_BIN`, falling back to `kou` on `PATH`.
    pub fn from_env() -> Self {
        let program = std::env::var_os(KOU_BIN_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KOU_BIN));
        Self { program }
    }

    /// Binary this runner invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for KouRunner {
    fn default() -> Self {
        Self::from_env()
    }
}

impl GenerationRunner for KouRunner {
    fn run(&self, config_path: &Path) -> Result<Vec<WatchCycleResult>, GenerateError> {
        debug!(program = %self.program.display(), config = %config_path.display(), "running generate");

        let output = Command::new(&self.program)
            .arg("generate")
            .arg(config_path)
            .arg("--output")
            .arg("json")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GenerateError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // A failed exit can still carry per-item results worth reporting.
        match parse_results(&output.stdout) {
            Ok(results) => Ok(results),
            Err(_) if !output.status.success() => Err(GenerateError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

/// Parse the tool's JSON output: an array of results, or an object wrapping
/// one under `results`.
pub fn parse_results(stdout: &[u8]) -> Result<Vec<WatchCycleResult>, GenerateError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Output {
        List(Vec<WatchCycleResult>),
        Wrapped { results: Vec<WatchCycleResult> },
    }

    let output: Output = serde_json::from_slice(stdout)?;
    Ok(match output {
        Output::List(results) | Output::Wrapped { results } => results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_output() {
        let results = parse_results(
            br#"[{"name":"home","path":"out/home.png","success":true},
                 {"name":"details","path":"","success":false,"error":"asset missing"}]"#,
        )
        .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert!(results[0].error.is_empty());
        assert_eq!(results[1].error, "asset missing");
    }

    #[test]
    fn test_parse_wrapped_output() {
        let results =
            parse_results(br#"{"results":[{"name":"home","path":"a.png","success":true}]}"#)
                .unwrap();
        assert_eq!(results[0].name, "home");
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(
            parse_results(b"Traceback: boom"),
            Err(GenerateError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let runner = KouRunner::new("/nonexistent/kou-binary");
        let err = runner.run(Path::new("koubou.yaml")).unwrap_err();
        assert!(matches!(err, GenerateError::Spawn { .. }));
    }

    #[test]
    fn test_error_omitted_when_empty() {
        let json = serde_json::to_string(&WatchCycleResult {
            name: "home".into(),
            path: "home.png".into(),
            success: true,
            error: String::new(),
        })
        .unwrap();
        assert!(!json.contains("error"));
    }
}
