//! Status command - check tools and show resolved directories

use crate::build::tool_version;
use crate::checkout::{resolve_work_dir, GitCheckout, ORIGINAL_DIR};
use crate::config::{CheckoutStrategy, Config, ConfigManager};
use crate::error::RelocheckResult;
use crate::scenario::{cache_dir, resolve_source};
use crate::ui::{self, UiContext};
use std::path::{Path, PathBuf};

/// Execute the status command
pub async fn execute(config: &Config, manager: &ConfigManager) -> RelocheckResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "relocheck status");

    let mut all_ok = true;

    ui::section(&ctx, "Tools");
    all_ok &= check_git(&ctx, config).await;

    let work_dir = resolve_work_dir(&config.checkout)
        .ok()
        .map(|d| config.resolve_path(&d));
    all_ok &= check_build_tool(&ctx, config, work_dir.as_deref()).await;

    ui::section(&ctx, "Directories");
    ui::key_value(&ctx, "Config", &manager.path().display().to_string());
    if let Some(ref base) = config.base_dir {
        ui::key_value(&ctx, "Project", &base.display().to_string());
    }
    match resolve_source(config) {
        Some(source) => ui::key_value(
            &ctx,
            "Source",
            &format!("{} ({})", source, config.checkout.strategy),
        ),
        None => {
            ui::step_warn_hint(
                &ctx,
                "No checkout source",
                "relocheck config set checkout.source <url-or-path>",
            );
            all_ok = false;
        }
    }
    if let Some(ref dir) = work_dir {
        ui::key_value(&ctx, "Work dir", &dir.display().to_string());
        ui::key_value(&ctx, "Build cache", &cache_dir(config, dir).display().to_string());
    }
    ui::key_value(
        &ctx,
        "Reports",
        &ConfigManager::reports_dir().display().to_string(),
    );

    ui::section(&ctx, "Scenarios");
    if config.scenarios.is_empty() {
        ui::step_warn_hint(&ctx, "No scenarios", "Add a [[scenario]] table to relocheck.toml");
        all_ok = false;
    }
    for scenario in &config.scenarios {
        let golden = config.resolve_path(&scenario.golden);
        let detail = format!("{} -> {}", scenario.tasks.join(" "), golden.display());
        if golden.is_file() {
            ui::step_ok_detail(&ctx, &scenario.name, &detail);
        } else {
            ui::step_warn_hint(
                &ctx,
                &format!("{}: golden table missing", scenario.name),
                &format!("relocheck golden record {}", scenario.name),
            );
        }
    }

    if all_ok {
        ui::outro_success(&ctx, "Ready to run");
    } else {
        ui::outro_error(&ctx, "Some checks failed - see above for details");
    }

    Ok(())
}

async fn check_git(ctx: &UiContext, config: &Config) -> bool {
    if GitCheckout::is_installed().await {
        ui::step_ok(ctx, "git");
        return true;
    }

    // Only the git strategy needs it
    if config.checkout.strategy == CheckoutStrategy::Git {
        ui::step_error_detail(ctx, "git", "not found in PATH");
        false
    } else {
        ui::step_info(ctx, "git not found (not needed for copy checkouts)");
        true
    }
}

async fn check_build_tool(ctx: &UiContext, config: &Config, work_dir: Option<&Path>) -> bool {
    let program = &config.build.program;

    let probe = match program.strip_prefix("./") {
        Some(relative) => match work_dir {
            Some(dir) if dir.join(ORIGINAL_DIR).is_dir() => dir.join(ORIGINAL_DIR).join(relative),
            _ => {
                ui::step_info(
                    ctx,
                    &format!("{} is resolved inside the checkout on first run", program),
                );
                return true;
            }
        },
        None => PathBuf::from(program),
    };

    match tool_version(&probe).await {
        Some(version) => {
            ui::step_ok_detail(ctx, program, &version);
            true
        }
        None => {
            ui::step_error_detail(ctx, program, "not runnable");
            false
        }
    }
}
