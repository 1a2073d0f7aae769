//! Relocation scenarios
//!
//! A scenario is a task list plus the golden table its relocated build must
//! reproduce. The runner prepares both checkouts, builds them in order against
//! the shared cache and compares the second build with the golden table.

mod report;
mod runner;

pub use report::{BuildSummary, RunReport, Verdict};
pub use runner::{
    cache_dir, resolve_source, select_scenarios, Observation, ScenarioRunner,
    CACHE_DIR_NAME,
};
