//! Error types for relocheck
//!
//! All modules use `RelocheckResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relocheck operations
pub type RelocheckResult<T> = Result<T, RelocheckError>;

/// All errors that can occur in relocheck
#[derive(Error, Debug)]
pub enum RelocheckError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No checkout source configured")]
    SourceNotConfigured,

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("No scenarios configured")]
    NoScenarios,

    // Golden table errors
    #[error("Invalid golden table at {path}: {reason}")]
    GoldenInvalid { path: PathBuf, reason: String },

    #[error("Golden table is empty: {0}")]
    GoldenEmpty(PathBuf),

    // Outcome errors
    #[error("Unknown task outcome '{label}' in line: {line}")]
    UnknownOutcome { label: String, line: String },

    #[error("{count} task outcome(s) differ from the golden table")]
    OutcomeMismatch { count: usize },

    // Checkout errors
    #[error("Failed to prepare checkout {dest}: {stderr}")]
    CheckoutFailed { dest: PathBuf, stderr: String },

    #[error("Checkout directories overlap: {original} and {relocated}")]
    CheckoutOverlap {
        original: PathBuf,
        relocated: PathBuf,
    },

    // Build errors
    #[error("Build failed in {dir} (exit code {code})\n{output_tail}")]
    BuildFailed {
        dir: PathBuf,
        code: i32,
        output_tail: String,
    },

    #[error("Build in {dir} timed out after {secs}s")]
    BuildTimeout { dir: PathBuf, secs: u64 },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process terminated by signal")]
    ProcessSignaled,

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl RelocheckError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether the error came out of an external build rather than the harness
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            Self::BuildFailed { .. } | Self::BuildTimeout { .. } | Self::ProcessSignaled
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::SourceNotConfigured => Some("Run: relocheck config set checkout.source <url-or-path>"),
            Self::NoScenarios => Some("Add a [[scenario]] table to relocheck.toml"),
            Self::GoldenEmpty(_) => Some("Run: relocheck golden record <scenario>"),
            Self::OutcomeMismatch { .. } => {
                Some("Some task cache keys depend on the checkout location")
            }
            Self::BuildTimeout { .. } => Some("Raise build.timeout_secs or set it to 0"),
            _ => None,
        }
    }
}
