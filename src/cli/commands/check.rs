//! Check command - compare a saved build log against a golden table

use crate::cli::args::{CheckArgs, OutputFormat};
use crate::compare::compare;
use crate::error::{RelocheckError, RelocheckResult};
use crate::golden::GoldenTable;
use crate::outcome::parse_console;
use crate::ui::{self, UiContext};
use tokio::fs;

/// Execute the check command
pub async fn execute(args: CheckArgs) -> RelocheckResult<()> {
    let json = args.format == OutputFormat::Json;
    let ctx = UiContext::detect().with_quiet(json);

    let golden = GoldenTable::load(&args.golden).await?;

    if !args.log.exists() {
        return Err(RelocheckError::PathNotFound(args.log));
    }
    let log = fs::read_to_string(&args.log)
        .await
        .map_err(|e| RelocheckError::io(format!("reading build log {}", args.log.display()), e))?;

    let observed = parse_console(log.lines())?;
    let comparison = compare(&golden, &observed);

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else if comparison.is_clean() {
        ui::step_ok_detail(
            &ctx,
            "Build log matches the golden table",
            &format!("{} tasks", comparison.summary.checked),
        );
    } else {
        ui::discrepancies(&ctx, &comparison);
    }

    if !comparison.is_clean() {
        return Err(RelocheckError::OutcomeMismatch {
            count: comparison.discrepancies.len(),
        });
    }
    Ok(())
}
