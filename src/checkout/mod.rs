//! Checkout preparation
//!
//! Produces the two independent checkouts a relocation run compares:
//! `<work_dir>/original` and `<work_dir>/relocated`.

mod copy;
mod git;
mod source;

pub use copy::CopyCheckout;
pub use git::GitCheckout;
pub use source::CheckoutSource;

use crate::config::schema::{CheckoutConfig, CheckoutStrategy};
use crate::config::ConfigManager;
use crate::error::{RelocheckError, RelocheckResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory names of the two checkouts inside the work dir
pub const ORIGINAL_DIR: &str = "original";
pub const RELOCATED_DIR: &str = "relocated";

/// The two prepared checkouts
#[derive(Debug, Clone)]
pub struct CheckoutPair {
    pub original: PathBuf,
    pub relocated: PathBuf,
}

/// Create the checkout source selected by the config
pub fn create_source(config: &CheckoutConfig) -> RelocheckResult<Box<dyn CheckoutSource>> {
    let source = config
        .source
        .as_deref()
        .ok_or(RelocheckError::SourceNotConfigured)?;

    match config.strategy {
        CheckoutStrategy::Git => Ok(Box::new(GitCheckout::new(source, config.git_ref.clone()))),
        CheckoutStrategy::Copy => Ok(Box::new(CopyCheckout::new(
            PathBuf::from(source),
            &config.exclude,
        ))),
    }
}

/// Work directory for a checkout config
///
/// Defaults to `<state>/work/<key>` where the key is derived from the source,
/// so different reference projects never share checkouts.
pub fn resolve_work_dir(config: &CheckoutConfig) -> RelocheckResult<PathBuf> {
    if let Some(ref dir) = config.work_dir {
        return Ok(dir.clone());
    }

    let source = config
        .source
        .as_deref()
        .ok_or(RelocheckError::SourceNotConfigured)?;
    Ok(ConfigManager::work_root().join(CheckoutConfig::source_key(source)))
}

/// Reject layouts where one directory would end up inside the other
pub fn check_distinct(a: &Path, b: &Path) -> RelocheckResult<()> {
    if a == b || a.starts_with(b) || b.starts_with(a) {
        return Err(RelocheckError::CheckoutOverlap {
            original: a.to_path_buf(),
            relocated: b.to_path_buf(),
        });
    }
    Ok(())
}

/// Prepare `original` and `relocated` checkouts under `work_dir`
pub async fn prepare_pair(
    source: &dyn CheckoutSource,
    work_dir: &Path,
) -> RelocheckResult<CheckoutPair> {
    let pair = CheckoutPair {
        original: work_dir.join(ORIGINAL_DIR),
        relocated: work_dir.join(RELOCATED_DIR),
    };
    check_distinct(&pair.original, &pair.relocated)?;

    // A copy source containing the work dir would copy itself recursively
    if let Some(root) = source.local_root() {
        check_distinct(root, work_dir)?;
    }

    debug!("Preparing {} -> {}", source.describe(), pair.original.display());
    source.prepare(&pair.original).await?;
    debug!("Preparing {} -> {}", source.describe(), pair.relocated.display());
    source.prepare(&pair.relocated).await?;

    Ok(pair)
}
