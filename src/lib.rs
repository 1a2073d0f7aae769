//! relocheck - build cache relocation checks
//!
//! Prepares two checkouts of one project in different directories, builds
//! both against a shared build cache and verifies the second build reports
//! exactly the task outcomes recorded in a golden table.

pub mod build;
pub mod checkout;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod golden;
pub mod outcome;
pub mod scenario;
pub mod ui;

pub use error::{RelocheckError, RelocheckResult};
