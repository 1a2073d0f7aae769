//! Golden command - show or record golden tables

use crate::cli::args::{GoldenAction, GoldenArgs};
use crate::config::Config;
use crate::error::{RelocheckError, RelocheckResult};
use crate::golden::GoldenTable;
use crate::outcome::cache_hits;
use crate::scenario::ScenarioRunner;
use crate::ui::{self, UiContext};

/// Execute the golden command
pub async fn execute(args: GoldenArgs, config: &Config) -> RelocheckResult<()> {
    match args.action {
        GoldenAction::Show { scenario } => show(config, &scenario).await,
        GoldenAction::Record {
            scenario,
            yes,
            keep_cache,
        } => record(config, &scenario, yes, keep_cache).await,
    }
}

async fn show(config: &Config, name: &str) -> RelocheckResult<()> {
    let ctx = UiContext::detect();
    let scenario = config
        .scenario(name)
        .ok_or_else(|| RelocheckError::ScenarioNotFound(name.to_string()))?;
    let path = config.resolve_path(&scenario.golden);
    let golden = GoldenTable::load(&path).await?;

    ui::key_value(&ctx, "Scenario", &scenario.name);
    ui::key_value(&ctx, "File", &path.display().to_string());
    ui::key_value(
        &ctx,
        "Tasks",
        &format!("{} ({} cache hits)", golden.len(), cache_hits(&golden.tasks)),
    );
    println!();
    ui::outcome_table(&golden.tasks);

    Ok(())
}

async fn record(config: &Config, name: &str, yes: bool, keep_cache: bool) -> RelocheckResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let scenario = config
        .scenario(name)
        .ok_or_else(|| RelocheckError::ScenarioNotFound(name.to_string()))?;
    let path = config.resolve_path(&scenario.golden);

    if path.exists() {
        let prompt = format!("Overwrite golden table {}?", path.display());
        if !ui::confirm(&ctx, &prompt, false).await? {
            ui::step_warn_hint(
                &ctx,
                &format!("Kept existing {}", path.display()),
                "Use --yes to overwrite",
            );
            return Ok(());
        }
    }

    ui::intro(&ctx, &format!("Recording {}", scenario.name));
    let runner = ScenarioRunner::from_config(config, ctx.clone())?
        .with_fresh_cache(config.build.fresh_cache && !keep_cache);
    let observation = runner.observe(&scenario.tasks).await?;

    let golden = GoldenTable::from_outcomes(observation.relocated.tasks);
    if golden.is_empty() {
        return Err(RelocheckError::GoldenEmpty(path));
    }
    golden.save(&path).await?;

    ui::outcome_table(&golden.tasks);
    ui::outro_success(
        &ctx,
        &format!("Recorded {} tasks to {}", golden.len(), path.display()),
    );
    Ok(())
}
