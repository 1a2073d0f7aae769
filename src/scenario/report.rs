//! Persisted record of one relocation run

use crate::build::BuildResult;
use crate::compare::Comparison;
use crate::error::{RelocheckError, RelocheckResult};
use crate::outcome::{cache_hits, OutcomeTable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Overall result of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
}

/// Condensed view of one build
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub dir: PathBuf,
    pub duration_ms: u64,
    pub tasks: usize,
    pub cache_hits: usize,
}

impl BuildSummary {
    pub fn new(dir: &Path, result: &BuildResult) -> Self {
        Self {
            dir: dir.to_path_buf(),
            duration_ms: result.duration.as_millis() as u64,
            tasks: result.tasks.len(),
            cache_hits: cache_hits(&result.tasks),
        }
    }
}

/// JSON report written after every scenario
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub id: Uuid,
    pub scenario: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub original: BuildSummary,
    pub relocated: BuildSummary,
    /// Outcomes reported by the relocated build
    pub observed: OutcomeTable,
    pub comparison: Comparison,
    pub verdict: Verdict,
}

impl RunReport {
    /// Number of discrepancies found
    pub fn failures(&self) -> usize {
        self.comparison.discrepancies.len()
    }

    /// File name the report is stored under
    ///
    /// The scenario name is reduced to file-safe characters and the run id
    /// keeps two runs started in the same millisecond apart.
    pub fn file_name(&self) -> String {
        let scenario: String = self
            .scenario
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
                _ => '_',
            })
            .collect();
        let id = self.id.simple().to_string();

        format!(
            "{}-{}-{}.json",
            scenario.trim_start_matches('.'),
            self.started_at.format("%Y%m%dT%H%M%S%.3fZ"),
            &id[..8]
        )
    }

    /// Write the report into `dir`, returning its path
    pub async fn save(&self, dir: &Path) -> RelocheckResult<PathBuf> {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| RelocheckError::io(format!("creating {}", dir.display()), e))?;

        let path = dir.join(self.file_name());
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .await
            .map_err(|e| RelocheckError::io(format!("writing report {}", path.display()), e))?;

        debug!("Report written to {}", path.display());
        Ok(path)
    }
}
