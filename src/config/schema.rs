//! Configuration schema for relocheck
//!
//! Global configuration is stored at `~/.config/relocheck/config.toml`;
//! a project-local `relocheck.toml` is merged over it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Where the two checkouts come from
    pub checkout: CheckoutConfig,

    /// External build tool invocation
    pub build: BuildConfig,

    /// Named scenarios, each a task list with its golden table
    #[serde(rename = "scenario", skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioConfig>,

    /// Directory relative scenario paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// Find a scenario by name
    pub fn scenario(&self, name: &str) -> Option<&ScenarioConfig> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Resolve a possibly-relative path against the config's directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.base_dir {
            Some(ref base) => base.join(path),
            None => path.to_path_buf(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: LogFormat,

    /// Persist a JSON report for every scenario run
    pub reports: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Text,
            reports: true,
        }
    }
}

/// How checkouts are produced from the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStrategy {
    /// `git clone` + `git clean`
    #[default]
    Git,
    /// Plain recursive directory copy
    Copy,
}

impl fmt::Display for CheckoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Copy => write!(f, "copy"),
        }
    }
}

/// Checkout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Git URL or local directory of the reference project
    pub source: Option<String>,

    /// Branch, tag or commit to check out
    pub git_ref: Option<String>,

    /// Checkout strategy
    pub strategy: CheckoutStrategy,

    /// File names skipped by the copy strategy
    pub exclude: Vec<String>,

    /// Parent of the two checkouts (defaults under the state directory)
    pub work_dir: Option<PathBuf>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            source: None,
            git_ref: None,
            strategy: CheckoutStrategy::Git,
            exclude: vec![".gradle".to_string(), "build".to_string()],
            work_dir: None,
        }
    }
}

impl CheckoutConfig {
    /// Short content key for the source, used to name the default work dir
    pub fn source_key(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let result = hasher.finalize();

        // First 12 hex characters (6 bytes)
        hex::encode(&result[..6])
    }
}

/// Build tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build program; `./` prefixed programs resolve inside the checkout
    pub program: String,

    /// Extra arguments appended after the task list
    pub args: Vec<String>,

    /// Pass `--build-cache`
    pub build_cache: bool,

    /// Pass `--scan`
    pub scan: bool,

    /// Init script passed with `-I` (generated when unset)
    pub init_script: Option<PathBuf>,

    /// Shared local cache directory (defaults to `<work_dir>/build-cache`)
    pub cache_dir: Option<PathBuf>,

    /// Run `clean` before the scenario tasks
    pub clean: bool,

    /// Wipe the shared cache before the first build
    pub fresh_cache: bool,

    /// Extra environment variables for the build
    pub env: HashMap<String, String>,

    /// Kill a build after N seconds (0 = no limit)
    pub timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: "./gradlew".to_string(),
            args: vec![],
            build_cache: true,
            scan: false,
            init_script: None,
            cache_dir: None,
            clean: true,
            fresh_cache: true,
            env: HashMap::new(),
            timeout_secs: 0,
        }
    }
}

/// One relocation scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name
    pub name: String,

    /// Tasks to run in both checkouts
    pub tasks: Vec<String>,

    /// Golden table path, relative to the config file
    pub golden: PathBuf,
}
