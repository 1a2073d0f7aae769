//! Git-backed checkouts

use crate::checkout::source::CheckoutSource;
use crate::error::{RelocheckError, RelocheckResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

/// Checkout produced with the `git` CLI
pub struct GitCheckout {
    url: String,
    git_ref: Option<String>,
}

impl GitCheckout {
    pub fn new(url: impl Into<String>, git_ref: Option<String>) -> Self {
        Self {
            url: url.into(),
            git_ref,
        }
    }

    /// Check if git is installed
    pub async fn is_installed() -> bool {
        Command::new("git")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run git, optionally inside `dir`, failing on a non-zero exit
    async fn git(&self, dir: Option<&Path>, args: &[&str], dest: &Path) -> RelocheckResult<()> {
        let mut cmd = Command::new("git");
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Executing: git {:?}", args);
        let output = cmd
            .output()
            .await
            .map_err(|e| RelocheckError::command_failed(format!("git {:?}", args), e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RelocheckError::CheckoutFailed {
                dest: dest.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn clone_fresh(&self, dest: &Path) -> RelocheckResult<()> {
        if dest.exists() {
            fs::remove_dir_all(dest)
                .await
                .map_err(|e| RelocheckError::io(format!("removing {}", dest.display()), e))?;
        }

        info!("Cloning {} into {}", self.url, dest.display());
        let dest_arg = dest.to_string_lossy();
        self.git(None, &["clone", "--quiet", &self.url, &dest_arg], dest)
            .await?;

        if let Some(ref r) = self.git_ref {
            self.git(Some(dest), &["checkout", "--quiet", "--force", r], dest)
                .await?;
        }
        Ok(())
    }

    async fn refresh(&self, dest: &Path) -> RelocheckResult<()> {
        info!("Refreshing existing clone {}", dest.display());
        self.git(Some(dest), &["fetch", "--quiet", "origin"], dest)
            .await?;

        let target = self.reset_target(dest).await;
        debug!("Resetting {} to {}", dest.display(), target);
        self.git(Some(dest), &["reset", "--hard", "--quiet", &target], dest)
            .await
    }

    /// Commit an existing clone is reset to
    ///
    /// Branches resolve through the fetched remote-tracking ref so a stale
    /// local branch never wins; tags and commit ids are used as given.
    async fn reset_target(&self, dest: &Path) -> String {
        let Some(ref r) = self.git_ref else {
            return "origin/HEAD".to_string();
        };

        let remote = format!("refs/remotes/origin/{}", r);
        if self.has_ref(dest, &remote).await {
            remote
        } else {
            r.clone()
        }
    }

    /// Whether `refname` names a commit in the clone at `dest`
    async fn has_ref(&self, dest: &Path, refname: &str) -> bool {
        Command::new("git")
            .arg("-C")
            .arg(dest)
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("{}^{{commit}}", refname))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl CheckoutSource for GitCheckout {
    async fn prepare(&self, dest: &Path) -> RelocheckResult<()> {
        if dest.join(".git").is_dir() {
            self.refresh(dest).await?;
        } else {
            self.clone_fresh(dest).await?;
        }

        // Drop build outputs and ignored local state left by a previous run
        self.git(Some(dest), &["clean", "-ffdx", "--quiet"], dest)
            .await
    }

    fn describe(&self) -> String {
        match self.git_ref {
            Some(ref r) => format!("{} @ {}", self.url, r),
            None => self.url.clone(),
        }
    }

    fn local_root(&self) -> Option<&Path> {
        let path = Path::new(&self.url);
        path.is_dir().then_some(path)
    }
}
