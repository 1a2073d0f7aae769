//! Scenario sequencing: prepare, build twice, compare

use crate::build::{BuildInvoker, BuildResult, GradleInvoker};
use crate::checkout::{
    create_source, prepare_pair, resolve_work_dir, CheckoutPair, CheckoutSource, ORIGINAL_DIR,
    RELOCATED_DIR,
};
use crate::compare::compare;
use crate::config::schema::CheckoutStrategy;
use crate::config::{Config, ScenarioConfig};
use crate::error::{RelocheckError, RelocheckResult};
use crate::golden::GoldenTable;
use crate::outcome::cache_hits;
use crate::scenario::report::{BuildSummary, RunReport, Verdict};
use crate::ui::{self, BuildProgress, TaskSpinner, UiContext};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Directory name of the default shared cache inside the work dir
pub const CACHE_DIR_NAME: &str = "build-cache";

/// Both builds of one scenario
#[derive(Debug, Clone)]
pub struct Observation {
    pub pair: CheckoutPair,
    pub original: BuildResult,
    pub relocated: BuildResult,
}

/// Drives one checkout source and one build tool through relocation runs
pub struct ScenarioRunner {
    source: Box<dyn CheckoutSource>,
    invoker: Box<dyn BuildInvoker>,
    work_dir: PathBuf,
    fresh_cache: bool,
    ctx: UiContext,
}

impl ScenarioRunner {
    pub fn new(
        source: Box<dyn CheckoutSource>,
        invoker: Box<dyn BuildInvoker>,
        work_dir: PathBuf,
        ctx: UiContext,
    ) -> Self {
        Self {
            source,
            invoker,
            work_dir,
            fresh_cache: true,
            ctx,
        }
    }

    /// Build a runner from the merged configuration
    pub fn from_config(config: &Config, ctx: UiContext) -> RelocheckResult<Self> {
        let mut checkout = config.checkout.clone();
        checkout.source = resolve_source(config);
        checkout.work_dir = checkout.work_dir.map(|d| config.resolve_path(&d));

        let source = create_source(&checkout)?;
        let work_dir = resolve_work_dir(&checkout)?;
        let cache_dir = cache_dir(config, &work_dir);
        debug!(
            "Work dir {}, cache dir {}",
            work_dir.display(),
            cache_dir.display()
        );

        let mut build = config.build.clone();
        build.init_script = build.init_script.map(|p| config.resolve_path(&p));
        let invoker = GradleInvoker::new(build, cache_dir, work_dir.clone());

        Ok(Self::new(source, Box::new(invoker), work_dir, ctx)
            .with_fresh_cache(config.build.fresh_cache))
    }

    /// Whether the shared cache is wiped before the first build
    pub fn with_fresh_cache(mut self, fresh: bool) -> Self {
        self.fresh_cache = fresh;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Prepare both checkouts and build each of them with `tasks`
    ///
    /// The original build populates the shared cache; a failure in either
    /// build aborts before anything is compared.
    pub async fn observe(&self, tasks: &[String]) -> RelocheckResult<Observation> {
        let mut spinner = TaskSpinner::new(&self.ctx);
        spinner.start(&format!("Preparing checkouts from {}...", self.source.describe()));
        let pair = match prepare_pair(self.source.as_ref(), &self.work_dir).await {
            Ok(pair) => {
                spinner.stop("Checkouts ready");
                pair
            }
            Err(e) => {
                spinner.stop_error("Checkout failed");
                return Err(e);
            }
        };

        if self.fresh_cache {
            self.invoker.reset_cache().await?;
        }

        let original = self.build(&pair.original, ORIGINAL_DIR, tasks).await?;
        let relocated = self.build(&pair.relocated, RELOCATED_DIR, tasks).await?;

        Ok(Observation {
            pair,
            original,
            relocated,
        })
    }

    async fn build(&self, dir: &Path, label: &str, tasks: &[String]) -> RelocheckResult<BuildResult> {
        let progress = BuildProgress::new(&self.ctx, label);
        let on_line = |line: &str| progress.on_line(line);
        let result = self.invoker.invoke(dir, tasks, &on_line).await;
        progress.finish();

        match result {
            Ok(build) => {
                ui::step_ok_detail(
                    &self.ctx,
                    &format!("Built {}", label),
                    &format!(
                        "{} tasks, {} from cache, {:.1}s",
                        build.tasks.len(),
                        cache_hits(&build.tasks),
                        build.duration.as_secs_f64()
                    ),
                );
                Ok(build)
            }
            Err(e) => {
                ui::step_error(
                    &self.ctx,
                    &format!("{} build failed in {}", self.invoker.tool_name(), label),
                );
                Err(e)
            }
        }
    }

    /// Run one scenario and compare the relocated build against `golden`
    pub async fn run(
        &self,
        name: &str,
        tasks: &[String],
        golden: &GoldenTable,
    ) -> RelocheckResult<RunReport> {
        let started_at = Utc::now();
        info!("Running scenario '{}' with tasks {:?}", name, tasks);

        let observation = self.observe(tasks).await?;
        let comparison = compare(golden, &observation.relocated.tasks);
        let verdict = if comparison.is_clean() {
            Verdict::Passed
        } else {
            Verdict::Failed
        };
        info!(
            "Scenario '{}': {} checked, {} discrepancies",
            name,
            comparison.summary.checked,
            comparison.discrepancies.len()
        );

        let original = BuildSummary::new(&observation.pair.original, &observation.original);
        let relocated = BuildSummary::new(&observation.pair.relocated, &observation.relocated);

        Ok(RunReport {
            id: Uuid::new_v4(),
            scenario: name.to_string(),
            started_at,
            finished_at: Utc::now(),
            original,
            relocated,
            observed: observation.relocated.tasks,
            comparison,
            verdict,
        })
    }
}

/// Checkout source with local paths made relative to the config file
///
/// Copy sources are always paths. A git source is treated as a path only
/// when it resolves to an existing directory, so remote URLs pass through.
pub fn resolve_source(config: &Config) -> Option<String> {
    let source = config.checkout.source.as_deref()?;
    let resolved = config.resolve_path(Path::new(source));

    match config.checkout.strategy {
        CheckoutStrategy::Copy => Some(resolved.display().to_string()),
        CheckoutStrategy::Git if resolved.is_dir() => Some(resolved.display().to_string()),
        CheckoutStrategy::Git => Some(source.to_string()),
    }
}

/// Shared cache directory: configured, or `<work_dir>/build-cache`
pub fn cache_dir(config: &Config, work_dir: &Path) -> PathBuf {
    match config.build.cache_dir {
        Some(ref dir) => config.resolve_path(dir),
        None => work_dir.join(CACHE_DIR_NAME),
    }
}

/// Scenarios named on the command line, or all of them when none are named
pub fn select_scenarios<'a>(
    config: &'a Config,
    names: &[String],
) -> RelocheckResult<Vec<&'a ScenarioConfig>> {
    if config.scenarios.is_empty() {
        return Err(RelocheckError::NoScenarios);
    }

    if names.is_empty() {
        return Ok(config.scenarios.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            config
                .scenario(name)
                .ok_or_else(|| RelocheckError::ScenarioNotFound(name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{OutcomeTable, TaskOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    struct FakeSource {
        prepared: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl CheckoutSource for FakeSource {
        async fn prepare(&self, dest: &Path) -> RelocheckResult<()> {
            std::fs::create_dir_all(dest).map_err(|e| RelocheckError::io("fake checkout", e))?;
            self.prepared.lock().unwrap().push(dest.to_path_buf());
            Ok(())
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    /// Reports `first` for the original checkout and `second` for the relocated one
    struct FakeInvoker {
        first: OutcomeTable,
        second: OutcomeTable,
        fail_relocated: bool,
        invocations: AtomicUsize,
        resets: AtomicUsize,
    }

    impl FakeInvoker {
        fn new(first: OutcomeTable, second: OutcomeTable) -> Self {
            Self {
                first,
                second,
                fail_relocated: false,
                invocations: AtomicUsize::new(0),
                resets: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BuildInvoker for FakeInvoker {
        async fn invoke(
            &self,
            dir: &Path,
            _tasks: &[String],
            on_output: &(dyn for<'a> Fn(&'a str) + Send + Sync),
        ) -> RelocheckResult<BuildResult> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            let relocated = dir.ends_with(RELOCATED_DIR);
            if relocated && self.fail_relocated {
                return Err(RelocheckError::BuildFailed {
                    dir: dir.to_path_buf(),
                    code: 1,
                    output_tail: "FAILURE: Build failed".to_string(),
                });
            }

            let tasks = if relocated { &self.second } else { &self.first };
            for task in tasks.keys() {
                on_output(&format!("> Task {}", task));
            }
            Ok(BuildResult {
                tasks: tasks.clone(),
                duration: Duration::from_millis(10),
                output: vec![],
            })
        }

        async fn reset_cache(&self) -> RelocheckResult<()> {
            self.resets.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn tool_name(&self) -> &'static str {
            "Fake"
        }
    }

    fn table(entries: &[(&str, TaskOutcome)]) -> OutcomeTable {
        entries
            .iter()
            .map(|(task, outcome)| (task.to_string(), *outcome))
            .collect()
    }

    fn runner(invoker: FakeInvoker, work_dir: &Path) -> ScenarioRunner {
        ScenarioRunner::new(
            Box::new(FakeSource {
                prepared: Mutex::new(vec![]),
            }),
            Box::new(invoker),
            work_dir.to_path_buf(),
            UiContext::non_interactive(),
        )
    }

    #[tokio::test]
    async fn matching_relocated_build_passes() {
        let temp = TempDir::new().unwrap();
        let first = table(&[(":app:compileJava", TaskOutcome::Success)]);
        let second = table(&[(":app:compileJava", TaskOutcome::FromCache)]);
        let golden = GoldenTable::from_outcomes(second.clone());

        let report = runner(FakeInvoker::new(first, second), temp.path())
            .run("assemble", &["assemble".to_string()], &golden)
            .await
            .unwrap();

        assert_eq!(report.verdict, Verdict::Passed);
        assert_eq!(report.relocated.cache_hits, 1);
        assert_eq!(report.original.cache_hits, 0);
        assert!(report.relocated.dir.ends_with(RELOCATED_DIR));
        assert_eq!(report.observed.len(), 1);
    }

    #[tokio::test]
    async fn compares_against_relocated_build_only() {
        let temp = TempDir::new().unwrap();
        let first = table(&[(":a", TaskOutcome::Success), (":b", TaskOutcome::Success)]);
        let second = table(&[(":a", TaskOutcome::Success), (":c", TaskOutcome::FromCache)]);
        let golden = GoldenTable::from_outcomes(table(&[
            (":a", TaskOutcome::FromCache),
            (":b", TaskOutcome::FromCache),
        ]));

        let report = runner(FakeInvoker::new(first, second), temp.path())
            .run("assemble", &[], &golden)
            .await
            .unwrap();

        assert_eq!(report.verdict, Verdict::Failed);
        assert_eq!(report.comparison.summary.mismatched, 1);
        assert_eq!(report.comparison.summary.missing, 1);
        assert_eq!(report.comparison.summary.unexpected, 1);
        assert_eq!(report.failures(), 3);
    }

    #[tokio::test]
    async fn failed_build_aborts_before_comparison() {
        let temp = TempDir::new().unwrap();
        let outcomes = table(&[(":a", TaskOutcome::Success)]);
        let mut invoker = FakeInvoker::new(outcomes.clone(), outcomes.clone());
        invoker.fail_relocated = true;

        let err = runner(invoker, temp.path())
            .run("assemble", &[], &GoldenTable::from_outcomes(outcomes))
            .await
            .unwrap_err();
        assert!(err.is_build_failure());
    }

    #[tokio::test]
    async fn observe_resets_cache_and_builds_both() {
        let temp = TempDir::new().unwrap();
        let outcomes = table(&[(":a", TaskOutcome::Success)]);

        let runner = runner(FakeInvoker::new(outcomes.clone(), outcomes), temp.path());
        let observation = runner.observe(&[]).await.unwrap();
        assert!(observation.pair.original.is_dir());
        assert!(observation.pair.relocated.is_dir());

        let kept = runner.with_fresh_cache(false);
        kept.observe(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn fresh_cache_controls_reset() {
        let temp = TempDir::new().unwrap();
        let invoker = std::sync::Arc::new(FakeInvoker::new(OutcomeTable::new(), OutcomeTable::new()));

        struct Shared(std::sync::Arc<FakeInvoker>);

        #[async_trait]
        impl BuildInvoker for Shared {
            async fn invoke(
                &self,
                dir: &Path,
                tasks: &[String],
                on_output: &(dyn for<'a> Fn(&'a str) + Send + Sync),
            ) -> RelocheckResult<BuildResult> {
                self.0.invoke(dir, tasks, on_output).await
            }

            async fn reset_cache(&self) -> RelocheckResult<()> {
                self.0.reset_cache().await
            }

            fn tool_name(&self) -> &'static str {
                self.0.tool_name()
            }
        }

        let make = |fresh: bool| {
            ScenarioRunner::new(
                Box::new(FakeSource {
                    prepared: Mutex::new(vec![]),
                }),
                Box::new(Shared(invoker.clone())),
                temp.path().to_path_buf(),
                UiContext::non_interactive(),
            )
            .with_fresh_cache(fresh)
        };

        make(true).observe(&[]).await.unwrap();
        make(false).observe(&[]).await.unwrap();

        assert_eq!(invoker.resets.load(Ordering::SeqCst), 1);
        assert_eq!(invoker.invocations.load(Ordering::SeqCst), 4);
    }

    fn config_with_scenarios() -> Config {
        let toml = r#"
            [[scenario]]
            name = "assemble"
            tasks = ["assemble"]
            golden = "golden/assemble.toml"

            [[scenario]]
            name = "test"
            tasks = ["test"]
            golden = "golden/test.toml"
        "#;
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn selects_all_scenarios_by_default() {
        let config = config_with_scenarios();
        let selected = select_scenarios(&config, &[]).unwrap();
        assert_eq!(selected.len(), 2);

        let selected = select_scenarios(&config, &["test".to_string()]).unwrap();
        assert_eq!(selected[0].name, "test");
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        let config = config_with_scenarios();
        let err = select_scenarios(&config, &["lint".to_string()]).unwrap_err();
        assert!(matches!(err, RelocheckError::ScenarioNotFound(ref n) if n == "lint"));

        let err = select_scenarios(&Config::default(), &[]).unwrap_err();
        assert!(matches!(err, RelocheckError::NoScenarios));
    }

    #[test]
    fn cache_dir_defaults_under_work_dir() {
        let mut config = Config::default();
        assert_eq!(
            cache_dir(&config, Path::new("/w")),
            PathBuf::from("/w/build-cache")
        );

        config.base_dir = Some(PathBuf::from("/project"));
        config.build.cache_dir = Some(PathBuf::from("cache"));
        assert_eq!(cache_dir(&config, Path::new("/w")), PathBuf::from("/project/cache"));
    }

    #[test]
    fn local_git_source_resolves_against_config_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("app")).unwrap();

        let mut config = Config::default();
        config.base_dir = Some(temp.path().join("project"));
        config.checkout.strategy = CheckoutStrategy::Git;
        config.checkout.source = Some("../app".to_string());
        assert_eq!(
            resolve_source(&config).map(PathBuf::from),
            Some(temp.path().join("project/../app"))
        );

        config.checkout.source = Some("https://example.com/app.git".to_string());
        assert_eq!(
            resolve_source(&config).as_deref(),
            Some("https://example.com/app.git")
        );

        config.checkout.strategy = CheckoutStrategy::Copy;
        config.checkout.source = Some("src".to_string());
        assert_eq!(
            resolve_source(&config).map(PathBuf::from),
            Some(temp.path().join("project/src"))
        );

        config.checkout.source = None;
        assert!(resolve_source(&config).is_none());
    }

    #[test]
    fn from_config_requires_source() {
        let err = ScenarioRunner::from_config(&Config::default(), UiContext::non_interactive())
            .err()
            .unwrap();
        assert!(matches!(err, RelocheckError::SourceNotConfigured));
    }
}
