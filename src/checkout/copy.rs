//! Directory-copy checkouts for sources that are not git repositories

use crate::checkout::source::CheckoutSource;
use crate::error::{RelocheckError, RelocheckResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Checkout produced by copying a local directory
pub struct CopyCheckout {
    root: PathBuf,
    exclude: HashSet<String>,
}

impl CopyCheckout {
    pub fn new(root: PathBuf, exclude: &[String]) -> Self {
        Self {
            root,
            exclude: exclude.iter().cloned().collect(),
        }
    }

    fn is_excluded(&self, name: &std::ffi::OsStr) -> bool {
        name.to_str().is_some_and(|n| self.exclude.contains(n))
    }

    /// Copy `self.root` into `dest`, returning the number of files written
    async fn copy_tree(&self, dest: &Path) -> RelocheckResult<usize> {
        let mut pending = vec![(self.root.clone(), dest.to_path_buf())];
        let mut files = 0;

        while let Some((from, to)) = pending.pop() {
            fs::create_dir_all(&to)
                .await
                .map_err(|e| RelocheckError::io(format!("creating {}", to.display()), e))?;

            let mut entries = fs::read_dir(&from)
                .await
                .map_err(|e| RelocheckError::io(format!("reading {}", from.display()), e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| RelocheckError::io(format!("reading entry in {}", from.display()), e))?
            {
                let name = entry.file_name();
                if self.is_excluded(&name) {
                    debug!("Skipping excluded {}", entry.path().display());
                    continue;
                }

                let src = entry.path();
                let dst = to.join(&name);
                let meta = fs::symlink_metadata(&src)
                    .await
                    .map_err(|e| RelocheckError::io(format!("inspecting {}", src.display()), e))?;

                if meta.is_dir() {
                    pending.push((src, dst));
                } else if meta.file_type().is_symlink() {
                    copy_symlink(&src, &dst).await?;
                    files += 1;
                } else {
                    fs::copy(&src, &dst)
                        .await
                        .map_err(|e| RelocheckError::io(format!("copying {}", src.display()), e))?;
                    files += 1;
                }
            }
        }

        Ok(files)
    }
}

#[cfg(unix)]
async fn copy_symlink(src: &Path, dst: &Path) -> RelocheckResult<()> {
    let target = fs::read_link(src)
        .await
        .map_err(|e| RelocheckError::io(format!("reading link {}", src.display()), e))?;
    fs::symlink(&target, dst)
        .await
        .map_err(|e| RelocheckError::io(format!("creating link {}", dst.display()), e))
}

#[cfg(not(unix))]
async fn copy_symlink(src: &Path, dst: &Path) -> RelocheckResult<()> {
    fs::copy(src, dst)
        .await
        .map(|_| ())
        .map_err(|e| RelocheckError::io(format!("copying {}", src.display()), e))
}

#[async_trait]
impl CheckoutSource for CopyCheckout {
    async fn prepare(&self, dest: &Path) -> RelocheckResult<()> {
        if !self.root.is_dir() {
            return Err(RelocheckError::PathNotFound(self.root.clone()));
        }

        if dest.exists() {
            fs::remove_dir_all(dest)
                .await
                .map_err(|e| RelocheckError::io(format!("removing {}", dest.display()), e))?;
        }

        let files = self.copy_tree(dest).await?;
        info!(
            "Copied {} files from {} into {}",
            files,
            self.root.display(),
            dest.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn local_root(&self) -> Option<&Path> {
        Some(&self.root)
    }
}
