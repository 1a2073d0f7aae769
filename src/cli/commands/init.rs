//! Init command - create project-local relocheck.toml

use crate::cli::args::InitArgs;
use crate::config::LOCAL_CONFIG_NAME;
use crate::error::{RelocheckError, RelocheckResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;

/// Template for project-local config
const INIT_TEMPLATE: &str = r#"# relocheck project configuration
# Settings here override your global config (~/.config/relocheck/config.toml)

[checkout]
source = "."
strategy = "copy"
# exclude = [".gradle", "build"]
# work_dir = "/tmp/relocheck"

[build]
# program = "./gradlew"
# args = ["--offline"]
# scan = false
# timeout_secs = 0

[[scenario]]
name = "assemble"
tasks = ["assemble"]
golden = "relocheck/golden/assemble.toml"
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> RelocheckResult<()> {
    let ctx = UiContext::detect();

    let target_dir = match args.path {
        Some(ref p) => p.clone(),
        None => std::env::current_dir()
            .map_err(|e| RelocheckError::io("getting current directory", e))?,
    };

    let config_path = target_dir.join(LOCAL_CONFIG_NAME);

    if config_path.exists() && !args.force {
        return Err(RelocheckError::User(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }

    ensure_dir(&target_dir).await?;

    fs::write(&config_path, INIT_TEMPLATE)
        .await
        .map_err(|e| RelocheckError::io(format!("writing {}", config_path.display()), e))?;

    ui::step_ok_detail(
        &ctx,
        "Created project config",
        &config_path.display().to_string(),
    );
    ui::remark(&ctx, "Record the first golden table with: relocheck golden record assemble");

    Ok(())
}

async fn ensure_dir(dir: &Path) -> RelocheckResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).await.map_err(|e| {
            RelocheckError::io(format!("creating directory {}", dir.display()), e)
        })?;
    }
    Ok(())
}
