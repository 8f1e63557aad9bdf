//! External tool invocation.
//!
//! The pipeline shells out to `ffprobe` (durations) and `ffmpeg` (the
//! merge). The probe runs through [`run`], which captures everything. The
//! merge runs through [`run_streaming`], which shows ffmpeg's progress on our
//! stderr while it works. Both block until the child exits and optionally
//! enforce a time limit. The child runs under a private current-thread tokio
//! runtime so the timeout can kill it; callers stay synchronous.
//!
//! Install ffmpeg (ships both tools):
//! - Windows: `winget install Gyan.FFmpeg`
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt install ffmpeg` or equivalent

pub mod ffmpeg;
pub mod ffprobe;

pub use ffmpeg::Ffmpeg;
pub use ffprobe::Ffprobe;

use std::ffi::OsStr;
use std::io::Write;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;

/// How long `-version` checks may take
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to run an external tool to completion.
///
/// A non-zero exit is not a `RunError`; callers inspect [`Output::status`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{program} not found. Please install ffmpeg: https://ffmpeg.org/download.html")]
    NotFound { program: String },

    #[error("Failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {}s", .limit.as_secs())]
    TimedOut { program: String, limit: Duration },
}

/// Only the startup check converts directly; probe and encode failures are
/// wrapped by their callers.
impl From<RunError> for crate::error::Error {
    fn from(e: RunError) -> Self {
        Self::Configuration(e.to_string())
    }
}

/// Exit status plus the last bytes the child wrote to stderr
#[derive(Debug)]
pub struct StreamedOutput {
    pub status: ExitStatus,
    pub stderr_tail: Vec<u8>,
}

fn command<I, S>(program: &str, args: I) -> tokio::process::Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
    cmd
}

fn runtime(program: &str) -> Result<tokio::runtime::Runtime, RunError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| RunError::Io {
            program: program.to_string(),
            source,
        })
}

/// Run `program` with `args`, capturing stdout and stderr.
///
/// With `timeout == None` this waits as long as the child runs.
pub fn run<I, S>(program: &str, args: I, timeout: Option<Duration>) -> Result<Output, RunError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = command(program, args);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let result = runtime(program)?.block_on(async {
        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(output) => output,
                Err(_) => {
                    return Err(RunError::TimedOut {
                        program: program.to_string(),
                        limit,
                    });
                }
            },
            None => cmd.output().await,
        };
        output.map_err(|source| spawn_error(program, source))
    });

    tracing::trace!(target: "tools", program, ok = result.is_ok(), "External tool finished");
    result
}

/// Run `program`, forwarding its stderr to ours as it arrives.
///
/// Stdout is discarded. At most `tail_limit` trailing stderr bytes are
/// kept for error reporting.
pub fn run_streaming<I, S>(
    program: &str,
    args: I,
    timeout: Option<Duration>,
    tail_limit: usize,
) -> Result<StreamedOutput, RunError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = command(program, args);
    cmd.stdout(Stdio::null()).stderr(Stdio::piped());

    let result = runtime(program)?.block_on(async {
        let mut child = cmd.spawn().map_err(|source| spawn_error(program, source))?;
        let mut stderr = child.stderr.take().ok_or_else(|| RunError::Io {
            program: program.to_string(),
            source: std::io::Error::other("stderr was not captured"),
        })?;

        let forward = async {
            let mut tail = Vec::new();
            let mut buf = [0u8; 4096];
            let mut terminal = std::io::stderr();
            loop {
                let n = stderr.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                // Terminal write errors are ignored
                let _ = terminal.write_all(&buf[..n]).and_then(|_| terminal.flush());
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > tail_limit {
                    let excess = tail.len() - tail_limit;
                    tail.drain(..excess);
                }
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>(StreamedOutput {
                status,
                stderr_tail: tail,
            })
        };

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, forward).await {
                Ok(output) => output,
                Err(_) => {
                    return Err(RunError::TimedOut {
                        program: program.to_string(),
                        limit,
                    });
                }
            },
            None => forward.await,
        };
        output.map_err(|source| RunError::Io {
            program: program.to_string(),
            source,
        })
    });

    tracing::trace!(target: "tools", program, ok = result.is_ok(), "External tool finished");
    result
}

fn spawn_error(program: &str, source: std::io::Error) -> RunError {
    if source.kind() == std::io::ErrorKind::NotFound {
        RunError::NotFound {
            program: program.to_string(),
        }
    } else {
        RunError::Io {
            program: program.to_string(),
            source,
        }
    }
}

/// First line of `program -version` (for diagnostics)
pub fn version(program: &str) -> Option<String> {
    run(program, ["-version"], Some(VERSION_CHECK_TIMEOUT))
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|l| l.trim().to_string())
        })
}

/// Fail with a configuration error unless every program can be started.
pub fn ensure_available(programs: &[&str]) -> crate::error::Result<()> {
    for program in programs {
        match version(program) {
            Some(v) => tracing::debug!(target: "tools", program, version = %v, "Tool available"),
            None => {
                return Err(RunError::NotFound {
                    program: program.to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}
