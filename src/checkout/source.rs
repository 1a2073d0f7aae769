//! Checkout source abstraction
//!
//! A source turns a directory into a pristine copy of the reference project.
//! Implementations:
//! - git: clone once, then fetch/reset/clean on reuse
//! - copy: recursive copy of a local directory

use crate::error::RelocheckResult;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait CheckoutSource: Send + Sync {
    /// Make `dest` an exact, clean copy of the reference project
    async fn prepare(&self, dest: &Path) -> RelocheckResult<()>;

    /// Human-readable source for display
    fn describe(&self) -> String;

    /// Local directory the source reads from, if any
    fn local_root(&self) -> Option<&Path> {
        None
    }
}
