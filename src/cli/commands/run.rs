//! Run command - execute relocation scenarios

use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{RelocheckError, RelocheckResult};
use crate::golden::GoldenTable;
use crate::scenario::{select_scenarios, RunReport, ScenarioRunner};
use crate::ui::{self, UiContext};
use std::path::Path;
use tracing::{debug, warn};

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config) -> RelocheckResult<()> {
    let json = args.format == OutputFormat::Json;
    let ctx = UiContext::detect().with_quiet(json);

    let scenarios = select_scenarios(config, &args.scenarios)?;

    // Every golden table must load before the first build starts
    let mut goldens = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        let path = config.resolve_path(&scenario.golden);
        debug!("Golden table for '{}': {}", scenario.name, path.display());
        goldens.push(GoldenTable::load(&path).await?);
    }

    let runner = ScenarioRunner::from_config(config, ctx.clone())?
        .with_fresh_cache(config.build.fresh_cache && !args.keep_cache);

    if !json {
        ui::intro(&ctx, "relocheck");
        ui::key_value(&ctx, "Work dir", &runner.work_dir().display().to_string());
    }

    let mut reports = Vec::with_capacity(scenarios.len());
    for (scenario, golden) in scenarios.iter().zip(&goldens) {
        ui::section(&ctx, &format!("Scenario {}", scenario.name));

        let report = runner.run(&scenario.name, &scenario.tasks, golden).await?;
        if config.general.reports {
            persist(&ctx, &report, &ConfigManager::reports_dir()).await;
        }
        if !json {
            print_report(&ctx, &report);
        }
        reports.push(report);
    }

    let failures: usize = reports.iter().map(RunReport::failures).sum();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if failures == 0 {
        ui::outro_success(
            &ctx,
            &format!("{} scenario(s) relocated cleanly", reports.len()),
        );
    } else {
        ui::outro_error(&ctx, "Relocated build diverged from the golden table");
    }

    if failures > 0 {
        return Err(RelocheckError::OutcomeMismatch { count: failures });
    }
    Ok(())
}

async fn persist(ctx: &UiContext, report: &RunReport, dir: &Path) {
    match report.save(dir).await {
        Ok(path) => ui::remark(ctx, &format!("Report: {}", path.display())),
        Err(e) => {
            warn!("Failed to write report: {}", e);
            ui::step_warn_hint(ctx, "Report not written", &e.to_string());
        }
    }
}

fn print_report(ctx: &UiContext, report: &RunReport) {
    let summary = &report.comparison.summary;

    if report.comparison.is_clean() {
        ui::step_ok_detail(
            ctx,
            &format!("{} matches its golden table", report.scenario),
            &format!("{} tasks", summary.checked),
        );
        return;
    }

    ui::discrepancies(ctx, &report.comparison);
    ui::step_error_detail(
        ctx,
        &format!("{} diverged", report.scenario),
        &format!(
            "{} mismatched, {} missing, {} unexpected",
            summary.mismatched, summary.missing, summary.unexpected
        ),
    );
}
