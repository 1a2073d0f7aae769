//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::outcome::parse_task_line;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
    quiet: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
            quiet: ctx.is_quiet(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Live view of a running build.
///
/// Counts `> Task` lines as they stream past and shows the most recent task
/// next to a spinner. Plain mode prints a single start line.
pub struct BuildProgress {
    bar: Option<ProgressBar>,
    tasks: AtomicU64,
    hits: AtomicU64,
}

impl BuildProgress {
    pub fn new(ctx: &UiContext, label: &str) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new_spinner();
            if let Ok(template) = ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} Building {prefix}  {msg:.dim}  {elapsed:.dim}")
            {
                bar.set_style(template.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            if !ctx.is_quiet() {
                println!("Building {}...", label);
            }
            None
        };

        Self {
            bar,
            tasks: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    /// Feed one output line from the build
    pub fn on_line(&self, line: &str) {
        let Some(Ok((path, outcome))) = parse_task_line(line) else {
            return;
        };

        let tasks = self.tasks.fetch_add(1, Ordering::Relaxed) + 1;
        let hits = if outcome.is_cache_hit() {
            self.hits.fetch_add(1, Ordering::Relaxed) + 1
        } else {
            self.hits.load(Ordering::Relaxed)
        };

        if let Some(ref bar) = self.bar {
            bar.set_message(format!("{} tasks, {} cached  {}", tasks, hits, path));
        }
    }

    /// Number of task lines seen so far
    pub fn tasks_seen(&self) -> u64 {
        self.tasks.load(Ordering::Relaxed)
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
