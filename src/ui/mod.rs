//! Terminal UI
//!
//! Uses `cliclack` for spinners and log lines in a terminal, and falls back
//! to plain `[OK]` / `[FAIL]` prefixed lines in CI or when piped.
//!
//! # Example
//!
//! ```rust,ignore
//! use relocheck::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//! ui::intro(&ctx, "relocheck: assemble");
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Preparing checkouts...");
//! spinner.stop("Checkouts ready");
//!
//! ui::outro_success(&ctx, "All task outcomes match");
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    discrepancies, intro, key_value, outcome_table, outro_error, outro_success, remark, section,
    step_error, step_error_detail, step_info, step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::{BuildProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, RelocheckTheme};
