use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::serdable::GlobPattern;
use crate::testing::{TestRunner, TestcaseFinder};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Read(#[from] fsutil::Error),

    #[error("Invalid config TOML '{0}': {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Invalid timeout in '{0}': must be a positive number of seconds")]
    InvalidTimeout(PathBuf),

    #[error("Invalid timeout {0}: must be a positive number of seconds")]
    TimeoutOutOfRange(f64),
}

/// `secs` as a time limit, if it is positive and fits in a `Duration`.
pub fn timeout_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    #[serde(default)]
    pub test: TestConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    pub timeout_secs: f64,
    pub testcase_dir: PathBuf,
    pub input_pattern: GlobPattern,
    pub output_pattern: GlobPattern,
    /// Program used to launch the target, e.g. `python3`.
    pub interpreter: Option<PathBuf>,
}

impl Default for TestConfig {
    fn default() -> Self {
        let finder = TestcaseFinder::default();
        Self {
            timeout_secs: TestRunner::DEFAULT_TIMEOUT.as_secs_f64(),
            testcase_dir: PathBuf::from(Self::DEFAULT_TESTCASE_DIR),
            input_pattern: finder.input_pattern,
            output_pattern: finder.output_pattern,
            interpreter: None,
        }
    }
}

impl TestConfig {
    pub const DEFAULT_TESTCASE_DIR: &str = "tests";

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        timeout_from_secs(self.timeout_secs)
            .ok_or(ConfigError::TimeoutOutOfRange(self.timeout_secs))
    }

    pub fn finder(&self) -> TestcaseFinder {
        TestcaseFinder::new(self.input_pattern.clone(), self.output_pattern.clone())
    }
}

impl Config {
    pub const FILENAME: &str = "grader.toml";

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> Result<Self, ConfigError> {
        let toml = fsutil::read_to_string(&filepath)?;
        let mut cfg = Self::from_toml(&toml).map_err(|e| ConfigError::Parse(filepath.clone(), e))?;
        if timeout_from_secs(cfg.test.timeout_secs).is_none() {
            return Err(ConfigError::InvalidTimeout(filepath));
        }
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Loads the nearest `grader.toml` in `cur_dir` or its ancestors; defaults if there is none.
    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match fsutil::find_file_in_ancestors(cur_dir, Self::FILENAME) {
            Some(filepath) => {
                log::debug!("Using config {}", filepath.to_string_lossy());
                Self::from_toml_file(filepath)
            }
            None => Ok(Self::default()),
        }
    }
}
