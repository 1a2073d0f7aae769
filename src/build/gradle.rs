//! Gradle build invoker
//!
//! Both checkouts share one local build cache. Unless the user supplies an
//! init script, we generate one that points the local cache at that shared
//! directory; the directory is also passed as `-Drelocheck.cacheDir`.

use crate::build::invoker::{BuildInvoker, BuildResult};
use crate::build::{output_tail, stream_child_output};
use crate::config::schema::BuildConfig;
use crate::error::{RelocheckError, RelocheckResult};
use crate::outcome::parse_console;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// File name of the generated init script inside the work dir
const INIT_SCRIPT_NAME: &str = "relocheck-init.gradle";

/// System property carrying the shared cache directory
const CACHE_DIR_PROPERTY: &str = "relocheck.cacheDir";

/// Invokes Gradle (or a wrapper script) with build-cache instrumentation
pub struct GradleInvoker {
    config: BuildConfig,
    cache_dir: PathBuf,
    work_dir: PathBuf,
}

impl GradleInvoker {
    pub fn new(config: BuildConfig, cache_dir: PathBuf, work_dir: PathBuf) -> Self {
        Self {
            config,
            cache_dir,
            work_dir,
        }
    }

    /// `./`-prefixed programs live inside the checkout
    pub fn resolve_program(&self, dir: &Path) -> PathBuf {
        match self.config.program.strip_prefix("./") {
            Some(relative) => dir.join(relative),
            None => PathBuf::from(&self.config.program),
        }
    }

    /// Full argument list for one invocation
    pub fn command_args(&self, init_script: &Path, tasks: &[String]) -> Vec<String> {
        let mut args = Vec::new();

        if self.config.build_cache {
            args.push("--build-cache".to_string());
        }
        if self.config.scan {
            args.push("--scan".to_string());
        }

        args.push("-I".to_string());
        args.push(init_script.display().to_string());
        args.push(format!("-D{}={}", CACHE_DIR_PROPERTY, self.cache_dir.display()));

        // Task lines are only printed one per task on the plain console
        args.push("--console=plain".to_string());

        if self.config.clean {
            args.push("clean".to_string());
        }
        args.extend(tasks.iter().cloned());
        args.extend(self.config.args.iter().cloned());

        args
    }

    /// Init script to pass with `-I`, generating the default one if needed
    pub async fn init_script(&self) -> RelocheckResult<PathBuf> {
        if let Some(ref script) = self.config.init_script {
            if !script.is_file() {
                return Err(RelocheckError::PathNotFound(script.clone()));
            }
            return Ok(script.clone());
        }

        fs::create_dir_all(&self.work_dir).await.map_err(|e| {
            RelocheckError::io(format!("creating {}", self.work_dir.display()), e)
        })?;

        let path = self.work_dir.join(INIT_SCRIPT_NAME);
        fs::write(&path, generated_init_script(&self.cache_dir))
            .await
            .map_err(|e| RelocheckError::io(format!("writing {}", path.display()), e))?;

        debug!("Generated init script at {}", path.display());
        Ok(path)
    }
}

/// Groovy init script routing the local build cache to `cache_dir`
fn generated_init_script(cache_dir: &Path) -> String {
    let escaped = cache_dir
        .display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('\'', "\\'");

    format!(
        r#"// Generated by relocheck; both checkouts share this local build cache.
gradle.settingsEvaluated {{ settings ->
    settings.buildCache {{
        local {{
            enabled = true
            directory = new File('{}')
        }}
    }}
}}
"#,
        escaped
    )
}

#[async_trait]
impl BuildInvoker for GradleInvoker {
    async fn invoke(
        &self,
        dir: &Path,
        tasks: &[String],
        on_output: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> RelocheckResult<BuildResult> {
        let program = self.resolve_program(dir);
        let init_script = self.init_script().await?;
        let args = self.command_args(&init_script, tasks);

        info!("Running {} in {}", program.display(), dir.display());
        debug!("Build arguments: {:?}", args);

        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(dir)
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RelocheckError::command_failed(program.display().to_string(), e))?;

        let started = Instant::now();
        let run = async {
            let output = stream_child_output(&mut child, on_output).await?;
            let status = child
                .wait()
                .await
                .map_err(|e| RelocheckError::io("waiting for build", e))?;
            Ok::<_, RelocheckError>((output, status))
        };

        let finished = if self.config.timeout_secs == 0 {
            Ok(run.await)
        } else {
            tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), run).await
        };

        let (output, status) = match finished {
            Ok(result) => result?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out build: {}", e);
                }
                return Err(RelocheckError::BuildTimeout {
                    dir: dir.to_path_buf(),
                    secs: self.config.timeout_secs,
                });
            }
        };
        let duration = started.elapsed();

        let code = status.code().ok_or(RelocheckError::ProcessSignaled)?;
        if code != 0 {
            return Err(RelocheckError::BuildFailed {
                dir: dir.to_path_buf(),
                code,
                output_tail: output_tail(&output),
            });
        }

        let tasks = parse_console(&output)?;
        info!(
            "Build in {} finished in {:.1}s with {} tasks",
            dir.display(),
            duration.as_secs_f64(),
            tasks.len()
        );

        Ok(BuildResult {
            tasks,
            duration,
            output,
        })
    }

    /// Delete and recreate the shared cache directory
    async fn reset_cache(&self) -> RelocheckResult<()> {
        if self.cache_dir.exists() {
            info!("Wiping build cache {}", self.cache_dir.display());
            fs::remove_dir_all(&self.cache_dir).await.map_err(|e| {
                RelocheckError::io(format!("removing {}", self.cache_dir.display()), e)
            })?;
        }

        fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            RelocheckError::io(format!("creating {}", self.cache_dir.display()), e)
        })
    }

    fn tool_name(&self) -> &'static str {
        "Gradle"
    }
}
