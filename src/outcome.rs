//! Task outcomes and console output parsing
//!
//! The build tool reports one line per task on its plain console:
//! `> Task :app:compileJava FROM-CACHE`. A missing label means the task ran.

use crate::error::{RelocheckError, RelocheckResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping from task path to outcome
pub type OutcomeTable = BTreeMap<String, TaskOutcome>;

/// Prefix of every task line on the plain console
const TASK_PREFIX: &str = "> Task ";

/// Outcome of a single task in a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskOutcome {
    /// Task actions executed
    Success,
    /// Task actions executed and failed
    Failed,
    /// Outputs were already current
    UpToDate,
    /// Task was skipped by an `onlyIf` or `-x`
    Skipped,
    /// Outputs were loaded from the build cache
    FromCache,
    /// Task had no inputs to process
    NoSource,
}

impl TaskOutcome {
    /// Parse the label printed after a task path (empty means executed)
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            "UP-TO-DATE" => Some(Self::UpToDate),
            "SKIPPED" => Some(Self::Skipped),
            "FROM-CACHE" => Some(Self::FromCache),
            "NO-SOURCE" => Some(Self::NoSource),
            _ => None,
        }
    }

    /// Whether the build avoided running the task's actions
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::FromCache | Self::UpToDate)
    }

    /// Name as written in golden tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::UpToDate => "UP_TO_DATE",
            Self::Skipped => "SKIPPED",
            Self::FromCache => "FROM_CACHE",
            Self::NoSource => "NO_SOURCE",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse one console line.
///
/// Returns `None` for lines that are not task lines, and an error for task
/// lines carrying a label we do not know.
pub fn parse_task_line(line: &str) -> Option<RelocheckResult<(String, TaskOutcome)>> {
    let rest = line.trim_end().strip_prefix(TASK_PREFIX)?;
    if !rest.starts_with(':') {
        return None;
    }

    let (path, label) = match rest.split_once(' ') {
        Some((path, label)) => (path, label.trim()),
        None => (rest, ""),
    };

    Some(match TaskOutcome::from_label(label) {
        Some(outcome) => Ok((path.to_string(), outcome)),
        None => Err(RelocheckError::UnknownOutcome {
            label: label.to_string(),
            line: line.to_string(),
        }),
    })
}

/// Collect task outcomes from a build's console output.
///
/// When a task is reported more than once, the last report wins.
pub fn parse_console<I, S>(lines: I) -> RelocheckResult<OutcomeTable>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut table = OutcomeTable::new();
    for line in lines {
        if let Some(parsed) = parse_task_line(line.as_ref()) {
            let (path, outcome) = parsed?;
            table.insert(path, outcome);
        }
    }
    Ok(table)
}

/// Count of cache hits in a table, for summaries
pub fn cache_hits(table: &OutcomeTable) -> usize {
    table.values().filter(|o| o.is_cache_hit()).count()
}
