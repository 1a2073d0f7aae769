//! Build invoker abstraction

use crate::error::RelocheckResult;
use crate::outcome::OutcomeTable;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// What one build invocation reported
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Task outcomes, ordered by task path
    pub tasks: OutcomeTable,
    /// Wall-clock time of the invocation
    pub duration: Duration,
    /// Combined stdout/stderr lines
    pub output: Vec<String>,
}

/// Runs the external build tool against a checkout
#[async_trait]
pub trait BuildInvoker: Send + Sync {
    /// Run `tasks` in `dir`, streaming every output line to `on_output`.
    ///
    /// A non-zero exit, a signal or a timeout is an error; no outcomes are
    /// returned for a failed build.
    async fn invoke(
        &self,
        dir: &Path,
        tasks: &[String],
        on_output: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> RelocheckResult<BuildResult>;

    /// Empty the cache shared by both checkouts
    async fn reset_cache(&self) -> RelocheckResult<()>;

    /// Human-readable tool name for display
    fn tool_name(&self) -> &'static str;
}
