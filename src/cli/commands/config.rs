//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, LOCAL_CONFIG_NAME};
use crate::error::{RelocheckError, RelocheckResult};
use crate::ui::{self, UiContext};
use std::path::{Path, PathBuf};
use tokio::fs;
use toml_edit::{Array, DocumentMut, Item};

/// How a config value is written to TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Str,
    Bool,
    Int,
    List,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> RelocheckResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, local }) => {
            let path = if local {
                local_config_path()?
            } else {
                manager.path().to_path_buf()
            };
            set_value(&path, &key, &value).await?
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> RelocheckResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> RelocheckResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

/// Nearest relocheck.toml above the cwd, or a new one in the cwd
fn local_config_path() -> RelocheckResult<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| RelocheckError::io("getting current directory", e))?;
    Ok(ConfigManager::find_local_config(&cwd).unwrap_or_else(|| cwd.join(LOCAL_CONFIG_NAME)))
}

async fn set_value(path: &Path, key: &str, value: &str) -> RelocheckResult<()> {
    let ctx = UiContext::detect();

    let content = if path.exists() {
        fs::read_to_string(path)
            .await
            .map_err(|e| RelocheckError::io(format!("reading {}", path.display()), e))?
    } else {
        String::new()
    };

    let updated = apply(&content, path, key, value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| RelocheckError::ConfigDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    fs::write(path, updated)
        .await
        .map_err(|e| RelocheckError::io(format!("writing {}", path.display()), e))?;

    ui::step_ok(&ctx, &format!("Set {} = {} in {}", key, value, path.display()));
    Ok(())
}

/// Set `key` in a TOML document, keeping the rest of its formatting
fn apply(content: &str, path: &Path, key: &str, value: &str) -> RelocheckResult<String> {
    let kind = value_kind(key)
        .ok_or_else(|| RelocheckError::User(format!("Unknown config key: {}", key)))?;

    let mut doc: DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        RelocheckError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, parents)) = parts.split_last() else {
        return Err(RelocheckError::User(format!("Unknown config key: {}", key)));
    };

    let mut table = doc.as_table_mut();
    for &part in parents {
        table = table
            .entry(part)
            .or_insert(toml_edit::table())
            .as_table_mut()
            .ok_or_else(|| RelocheckError::User(format!("Expected table at key: {}", part)))?;
    }
    table.insert(leaf, to_item(kind, value)?);

    let updated = doc.to_string();

    // Reject values the schema would not load
    toml::from_str::<Config>(&updated).map_err(|e| RelocheckError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(updated)
}

fn value_kind(key: &str) -> Option<ValueKind> {
    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["general", "log_format"] => Some(ValueKind::Str),
        ["general", "reports"] => Some(ValueKind::Bool),
        ["checkout", "source" | "git_ref" | "strategy" | "work_dir"] => Some(ValueKind::Str),
        ["checkout", "exclude"] => Some(ValueKind::List),
        ["build", "program" | "init_script" | "cache_dir"] => Some(ValueKind::Str),
        ["build", "args"] => Some(ValueKind::List),
        ["build", "build_cache" | "scan" | "clean" | "fresh_cache"] => Some(ValueKind::Bool),
        ["build", "timeout_secs"] => Some(ValueKind::Int),
        ["build", "env", name] if !name.is_empty() => Some(ValueKind::Str),
        _ => None,
    }
}

fn to_item(kind: ValueKind, value: &str) -> RelocheckResult<Item> {
    let item = match kind {
        ValueKind::Str => toml_edit::value(value),
        ValueKind::Bool => toml_edit::value(parse_bool(value)?),
        ValueKind::Int => toml_edit::value(parse_i64(value)?),
        ValueKind::List => toml_edit::value(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Array>(),
        ),
    };
    Ok(item)
}

fn parse_bool(value: &str) -> RelocheckResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(RelocheckError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_i64(value: &str) -> RelocheckResult<i64> {
    value
        .parse()
        .map_err(|_| RelocheckError::User(format!("Invalid number: {}", value)))
}
