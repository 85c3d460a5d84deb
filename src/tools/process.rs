//! Subprocess execution for tool adapters
//!
//! Adapters never branch on "did the call throw"; they get a typed
//! [`ExecOutput`] and interpret exit codes themselves, since several of
//! the wrapped tools exit nonzero simply because they found something to
//! report.

use super::ToolError;
use anyhow::Result;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Signal number clang tools die with when they hit an internal segfault.
pub const SIGSEGV: i32 = 11;

/// Typed outcome of one subprocess run.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Exit code; absent when the process died on a signal
    pub code: Option<i32>,
    /// Terminating signal, if any (Unix only)
    pub signal: Option<i32>,
    /// stdout followed by stderr
    pub merged: String,
}

impl ExecOutput {
    pub fn crashed_by_signal(&self, signal: i32) -> bool {
        self.signal == Some(signal)
    }
}

/// Run a command to completion, merging stdout and stderr.
///
/// `timeout_secs == 0` disables the timeout; otherwise the child is
/// killed on expiry and [`ToolError::TimedOut`] is returned. A missing
/// executable surfaces as [`ToolError::NotInstalled`].
pub fn run_tool(
    tool: &str,
    cmd: &mut Command,
    cwd: Option<&Path>,
    timeout_secs: u64,
) -> Result<ExecOutput> {
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("running {tool}: {cmd:?}");

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::new(ToolError::NotInstalled {
                tool: tool.to_string(),
            })
        } else {
            anyhow::Error::new(e).context(format!("failed to spawn {tool}"))
        }
    })?;

    // Drain both pipes on their own threads so a chatty tool cannot fill
    // a pipe buffer and deadlock against the wait below.
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = if timeout_secs == 0 {
        child.wait()?
    } else {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() > Duration::from_secs(timeout_secs) {
                let _ = child.kill();
                let _ = child.wait();
                warn!("{tool} timed out after {timeout_secs}s");
                return Err(ToolError::TimedOut {
                    tool: tool.to_string(),
                    seconds: timeout_secs,
                }
                .into());
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    };

    let mut merged = stdout.join().unwrap_or_default();
    let err = stderr.join().unwrap_or_default();
    if !err.is_empty() {
        if !merged.is_empty() && !merged.ends_with('\n') {
            merged.push('\n');
        }
        merged.push_str(&err);
    }

    Ok(ExecOutput {
        code: status.code(),
        signal: status_signal(&status),
        merged,
    })
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[cfg(unix)]
fn status_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn status_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

/// Check whether a tool responds to `--version`.
pub fn is_tool_installed(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Re-invoke `run` while the wrapped tool keeps dying with SIGSEGV.
///
/// Such crashes are internal to the tool and unrelated to the code under
/// analysis. Each crash consumes one try; once `tries` drops below zero
/// the crash is surfaced as [`ToolError::Crashed`].
pub fn run_with_retries<F>(tool: &str, mut tries: i32, mut run: F) -> Result<ExecOutput>
where
    F: FnMut() -> Result<ExecOutput>,
{
    loop {
        let output = run()?;
        if !output.crashed_by_signal(SIGSEGV) {
            return Ok(output);
        }
        if tries < 0 {
            return Err(ToolError::Crashed {
                tool: tool.to_string(),
                code: output.code,
                signal: output.signal,
            }
            .into());
        }
        debug!("{tool} crashed with SIGSEGV; retrying ({tries} tries left)");
        tries -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_typed_not_installed() {
        let mut cmd = Command::new("definitely-not-a-real-tool-acb123");
        let err = run_tool("definitely-not-a-real-tool-acb123", &mut cmd, None, 0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::NotInstalled { .. })
        ));
    }

    #[test]
    fn test_merged_output_and_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = run_tool("sh", &mut cmd, None, 0).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(output.merged.contains("out"));
        assert!(output.merged.contains("err"));
        assert_eq!(output.signal, None);
    }

    #[test]
    fn test_timeout_kills_the_child() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let start = Instant::now();
        let err = run_tool("sleep", &mut cmd, None, 1).unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::TimedOut { seconds: 1, .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_is_reported() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "kill -SEGV $$"]);
        let output = run_tool("sh", &mut cmd, None, 0).unwrap();
        assert!(output.crashed_by_signal(SIGSEGV));
        assert_eq!(output.code, None);
    }

    #[test]
    fn test_retry_until_tries_run_out() {
        let mut invocations = 0;
        let result = run_with_retries("crashy", 2, || {
            invocations += 1;
            Ok(ExecOutput {
                code: None,
                signal: Some(SIGSEGV),
                merged: String::new(),
            })
        });

        assert!(result.is_err());
        // Initial run, then retries at tries = 2, 1, 0
        assert_eq!(invocations, 4);
        assert!(matches!(
            result.unwrap_err().downcast_ref::<ToolError>(),
            Some(ToolError::Crashed {
                signal: Some(SIGSEGV),
                ..
            })
        ));
    }

    #[test]
    fn test_retry_stops_on_clean_exit() {
        let mut invocations = 0;
        let result = run_with_retries("flaky", 5, || {
            invocations += 1;
            Ok(ExecOutput {
                code: Some(0),
                signal: if invocations < 3 { Some(SIGSEGV) } else { None },
                merged: "done".into(),
            })
        })
        .unwrap();

        assert_eq!(invocations, 3);
        assert_eq!(result.merged, "done");
    }
}
