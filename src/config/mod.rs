//! Configuration management for relocheck

pub mod schema;

pub use schema::{CheckoutStrategy, Config, LogFormat, ScenarioConfig};

use crate::error::{RelocheckError, RelocheckResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of the project-local config
pub const LOCAL_CONFIG_NAME: &str = "relocheck.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("relocheck")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("relocheck")
    }

    /// Get the run reports directory path
    pub fn reports_dir() -> PathBuf {
        Self::state_dir().join("reports")
    }

    /// Get the default parent of per-source work directories
    pub fn work_root() -> PathBuf {
        Self::state_dir().join("work")
    }

    /// Walk up from `start` looking for a project-local config
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> RelocheckResult<Config> {
        self.load_merged(None).await
    }

    /// Load the global config with an optional local config merged over it
    ///
    /// Tables merge key by key; any other value in the local file replaces
    /// the global one outright.
    pub async fn load_merged(&self, local: Option<&Path>) -> RelocheckResult<Config> {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut base_dir = self.config_path.parent().map(Path::to_path_buf);

        if self.config_path.exists() {
            merged = Self::read_value(&self.config_path).await?;
        } else {
            debug!("Config file not found, using defaults");
        }

        if let Some(local_path) = local {
            let overlay = Self::read_value(local_path).await?;
            merge_values(&mut merged, overlay);
            base_dir = local_path.parent().map(Path::to_path_buf);
        }

        let reported_path = local.unwrap_or(&self.config_path).to_path_buf();
        let mut config: Config =
            merged
                .try_into()
                .map_err(|e: toml::de::Error| RelocheckError::ConfigInvalid {
                    path: reported_path,
                    reason: e.to_string(),
                })?;
        config.base_dir = base_dir;
        Ok(config)
    }

    async fn read_value(path: &Path) -> RelocheckResult<toml::Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RelocheckError::io(format!("reading config from {}", path.display()), e))?;

        content
            .parse::<toml::Table>()
            .map(toml::Value::Table)
            .map_err(|e| RelocheckError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> RelocheckResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            RelocheckError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> RelocheckResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RelocheckError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Ensure all state directories exist
    pub async fn ensure_state_dirs() -> RelocheckResult<()> {
        let dirs = [Self::state_dir(), Self::reports_dir(), Self::work_root()];

        for dir in &dirs {
            fs::create_dir_all(dir).await.map_err(|e| {
                RelocheckError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }

        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `overlay` into `base`
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
