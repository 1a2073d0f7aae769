//! External build tool invocation
//!
//! The build tool is an opaque collaborator: we spawn it, stream its output,
//! and read task outcomes back from its plain console.

mod gradle;
mod invoker;

pub use gradle::GradleInvoker;
pub use invoker::{BuildInvoker, BuildResult};

use crate::error::{RelocheckError, RelocheckResult};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Last `BUILD_ERROR_TAIL_LINES` lines of a build's combined output
pub(crate) fn output_tail(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(BUILD_ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Lines are split on raw bytes and decoded lossily, so output that is not
/// valid UTF-8 never ends the stream early. Returns all collected output lines
/// in arrival order.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn for<'a> Fn(&'a str) + Send + Sync),
) -> RelocheckResult<Vec<String>> {
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RelocheckError::Internal("build stderr was not piped".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RelocheckError::Internal("build stdout was not piped".to_string()))?;

    let mut stderr_reader = BufReader::new(stderr);
    let mut stdout_reader = BufReader::new(stdout);
    // Bytes of a cancelled read stay in these buffers until the next call
    let mut stderr_buf = Vec::new();
    let mut stdout_buf = Vec::new();

    let mut all_output = Vec::new();
    let mut stderr_done = false;
    let mut stdout_done = false;

    while !stderr_done || !stdout_done {
        tokio::select! {
            read = stderr_reader.read_until(b'\n', &mut stderr_buf), if !stderr_done => {
                let n = read.map_err(|e| RelocheckError::io("reading build stderr", e))?;
                stderr_done = n == 0;
                emit_line(&mut stderr_buf, on_output, &mut all_output);
            }
            read = stdout_reader.read_until(b'\n', &mut stdout_buf), if !stdout_done => {
                let n = read.map_err(|e| RelocheckError::io("reading build stdout", e))?;
                stdout_done = n == 0;
                emit_line(&mut stdout_buf, on_output, &mut all_output);
            }
        }
    }

    Ok(all_output)
}

/// Decode one buffered line, hand it to `on_output` and clear the buffer
fn emit_line(
    buf: &mut Vec<u8>,
    on_output: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    all_output: &mut Vec<String>,
) {
    if buf.is_empty() {
        return;
    }

    let line = String::from_utf8_lossy(buf)
        .trim_end_matches(['\n', '\r'])
        .to_string();
    buf.clear();

    on_output(&line);
    all_output.push(line);
}

/// First line of `<program> --version` that names a version, if the program runs
pub async fn tool_version(program: &Path) -> Option<String> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('-'))
        .map(str::to_string)
}
