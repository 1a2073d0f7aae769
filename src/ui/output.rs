//! Output functions for consistent CLI formatting

use super::context::UiContext;
use crate::compare::{Comparison, Discrepancy};
use crate::outcome::{OutcomeTable, TaskOutcome};
use console::{style, StyledObject};

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
        println!();
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Display error outro
pub fn outro_error(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).red().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[FAIL]").red(), message);
    }
}

/// Display a section header
pub fn section(ctx: &UiContext, title: &str) {
    if ctx.is_quiet() {
        return;
    }
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("  {} {}", style("[OK]").green(), message);
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        println!("  {} {} ({})", style("[OK]").green(), message, detail);
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        println!("  {} {} - {}", style("[WARN]").yellow(), message, hint);
    }
}

/// Display an error step
pub fn step_error(ctx: &UiContext, message: &str) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::error(message).ok();
    } else {
        println!("  {} {}", style("[FAIL]").red(), message);
    }
}

/// Display an error step with detail
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::error(format!("{}: {}", message, style(detail).red())).ok();
    } else {
        println!("  {} {}: {}", style("[FAIL]").red(), message, detail);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        println!("  {} {}", style("[INFO]").cyan(), message);
    }
}

/// Display a remark/hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

fn styled_outcome(outcome: TaskOutcome) -> StyledObject<&'static str> {
    let styled = style(outcome.as_str());
    match outcome {
        TaskOutcome::FromCache | TaskOutcome::UpToDate => styled.green(),
        TaskOutcome::Success => styled.yellow(),
        TaskOutcome::Failed => styled.red(),
        TaskOutcome::Skipped | TaskOutcome::NoSource => styled.dim(),
    }
}

/// Print an outcome table as two aligned columns
pub fn outcome_table(tasks: &OutcomeTable) {
    let width = tasks.keys().map(String::len).max().unwrap_or(4).max(4);

    println!("  {:<width$}  {}", style("TASK").bold(), style("OUTCOME").bold());
    for (task, outcome) in tasks {
        println!("  {:<width$}  {}", task, styled_outcome(*outcome));
    }
}

/// Print every discrepancy of a comparison, one per line
pub fn discrepancies(ctx: &UiContext, comparison: &Comparison) {
    for d in &comparison.discrepancies {
        let line = match d {
            Discrepancy::Mismatch {
                task,
                expected,
                actual,
            } => format!(
                "{} expected {} but was {}",
                task,
                styled_outcome(*expected),
                styled_outcome(*actual)
            ),
            Discrepancy::Missing { task, expected } => format!(
                "{} expected {} but did not run",
                task,
                styled_outcome(*expected)
            ),
            Discrepancy::Unexpected { task, actual } => format!(
                "{} ran as {} but is not in the golden table",
                task,
                styled_outcome(*actual)
            ),
        };
        step_error(ctx, &line);
    }
}
