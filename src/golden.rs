//! Golden tables of expected task outcomes
//!
//! A golden table is a TOML file with a single `[tasks]` table mapping task
//! paths to outcome names:
//!
//! ```toml
//! [tasks]
//! ":app:compileJava" = "FROM_CACHE"
//! ":app:processResources" = "NO_SOURCE"
//! ```

use crate::error::{RelocheckError, RelocheckResult};
use crate::outcome::{OutcomeTable, TaskOutcome};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Expected outcome for every task of a relocated build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenTable {
    /// Task path to expected outcome
    #[serde(default)]
    pub tasks: OutcomeTable,
}

impl GoldenTable {
    /// Build a golden table from observed outcomes
    pub fn from_outcomes(tasks: OutcomeTable) -> Self {
        Self { tasks }
    }

    /// Parse a golden table from TOML text
    pub fn parse(content: &str, path: &Path) -> RelocheckResult<Self> {
        toml::from_str(content).map_err(|e| RelocheckError::GoldenInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load a golden table, rejecting empty tables
    pub async fn load(path: &Path) -> RelocheckResult<Self> {
        if !path.exists() {
            return Err(RelocheckError::PathNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RelocheckError::io(format!("reading golden table {}", path.display()), e))?;

        let table = Self::parse(&content, path)?;
        if table.is_empty() {
            return Err(RelocheckError::GoldenEmpty(path.to_path_buf()));
        }

        debug!("Loaded {} golden entries from {}", table.len(), path.display());
        Ok(table)
    }

    /// Write the table to disk, creating parent directories
    pub async fn save(&self, path: &Path) -> RelocheckResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RelocheckError::io(format!("creating {}", parent.display()), e))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .map_err(|e| RelocheckError::io(format!("writing golden table {}", path.display()), e))?;

        info!("Golden table saved to {}", path.display());
        Ok(())
    }

    /// Expected outcome for a task
    pub fn expected(&self, task: &str) -> Option<TaskOutcome> {
        self.tasks.get(task).copied()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
