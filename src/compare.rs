//! Golden table vs. observed outcome comparison
//!
//! Every entry on both sides is examined before a verdict is reached, so a
//! single run reports the complete diff.

use crate::golden::GoldenTable;
use crate::outcome::{OutcomeTable, TaskOutcome};
use serde::Serialize;
use std::fmt;

/// One difference between the golden table and a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Discrepancy {
    /// Task ran with a different outcome than expected
    Mismatch {
        task: String,
        expected: TaskOutcome,
        actual: TaskOutcome,
    },
    /// Task is in the golden table but the build never reported it
    Missing { task: String, expected: TaskOutcome },
    /// Task was reported by the build but is not in the golden table
    Unexpected { task: String, actual: TaskOutcome },
}

impl Discrepancy {
    /// Task path this discrepancy concerns
    pub fn task(&self) -> &str {
        match self {
            Self::Mismatch { task, .. } | Self::Missing { task, .. } | Self::Unexpected { task, .. } => {
                task
            }
        }
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch {
                task,
                expected,
                actual,
            } => write!(f, "{}: expected {} but was {}", task, expected, actual),
            Self::Missing { task, expected } => {
                write!(f, "{}: expected {} but the task did not run", task, expected)
            }
            Self::Unexpected { task, actual } => {
                write!(f, "{}: not in golden table (was {})", task, actual)
            }
        }
    }
}

/// Counts per discrepancy kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub checked: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing: usize,
    pub unexpected: usize,
}

/// Result of comparing a golden table with an observed outcome table
#[derive(Debug, Clone, Default, Serialize)]
pub struct Comparison {
    /// All discrepancies, ordered by task path
    pub discrepancies: Vec<Discrepancy>,
    /// Per-kind counts
    pub summary: Summary,
}

impl Comparison {
    /// True when outcomes and task sets both match exactly
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Compare expected outcomes with the outcomes a build reported
pub fn compare(golden: &GoldenTable, actual: &OutcomeTable) -> Comparison {
    let mut discrepancies = Vec::new();
    let mut summary = Summary {
        checked: golden.len(),
        ..Summary::default()
    };

    for (task, &expected) in &golden.tasks {
        match actual.get(task) {
            Some(&observed) if observed == expected => summary.matched += 1,
            Some(&observed) => {
                summary.mismatched += 1;
                discrepancies.push(Discrepancy::Mismatch {
                    task: task.clone(),
                    expected,
                    actual: observed,
                });
            }
            None => {
                summary.missing += 1;
                discrepancies.push(Discrepancy::Missing {
                    task: task.clone(),
                    expected,
                });
            }
        }
    }

    for (task, &observed) in actual {
        if golden.expected(task).is_none() {
            summary.unexpected += 1;
            discrepancies.push(Discrepancy::Unexpected {
                task: task.clone(),
                actual: observed,
            });
        }
    }

    discrepancies.sort_by(|a, b| a.task().cmp(b.task()));

    Comparison {
        discrepancies,
        summary,
    }
}
