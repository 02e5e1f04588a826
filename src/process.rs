//! Bounded external process execution
//!
//! Runs a command with both output streams captured by companion tasks and
//! races the child against a timeout. A child that overruns is killed and
//! then awaited; waiting for it to exit after the kill is not bounded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use crate::error::{TidyError, TidyResult};

/// Program plus arguments, with an optional working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl CommandLine {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program name for messages
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Readable rendering of the full command
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion or until `timeout` elapses.
    ///
    /// Errors only when the process cannot be spawned or awaited; tool
    /// failures are reported through [`ProcessOutput`].
    pub async fn run(&self, timeout: Duration) -> std::io::Result<ProcessOutput> {
        debug!("Running '{}' (timeout {:?})", self.display(), timeout);

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;

        let stdout = child.stdout.take().map(|pipe| tokio::spawn(read_all(pipe)));
        let stderr = child.stderr.take().map(|pipe| tokio::spawn(read_all(pipe)));

        let (status, was_terminated) = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => (status?, false),
            Err(_) => {
                warn!("'{}' exceeded {:?}, terminating", self.display(), timeout);
                child.kill().await?;
                (child.wait().await?, true)
            }
        };

        let stdout = collect(stdout).await?;
        let stderr = collect(stderr).await?;

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            was_terminated,
        })
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut pipe: R) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    pipe.read_to_end(&mut buffer).await?;
    Ok(buffer)
}

async fn collect(
    task: Option<tokio::task::JoinHandle<std::io::Result<Vec<u8>>>>,
) -> std::io::Result<Option<Vec<u8>>> {
    match task {
        Some(handle) => handle.await.map_err(std::io::Error::other)?.map(Some),
        None => Ok(None),
    }
}

/// Captured result of a finished or terminated process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
    /// `None` when the stream could not be captured
    pub stdout: Option<Vec<u8>>,
    pub stderr: Option<Vec<u8>>,
    /// The timeout fired; captured output is unreliable
    pub was_terminated: bool,
}

impl ProcessOutput {
    /// Accept the output as valid tool output, or classify the failure
    pub fn into_stdout(self, tool: &str) -> TidyResult<Vec<u8>> {
        if self.was_terminated {
            return Err(TidyError::tool(tool, "terminated after exceeding the timeout"));
        }

        match self.exit_code {
            Some(0) => {}
            Some(code) => {
                return Err(TidyError::tool(
                    tool,
                    format!("exited with status {}{}", code, stderr_suffix(self.stderr.as_deref())),
                ))
            }
            None => return Err(TidyError::tool(tool, "terminated by a signal")),
        }

        if let Some(stderr) = self.stderr.as_deref().filter(|bytes| !bytes.is_empty()) {
            return Err(TidyError::tool(
                tool,
                format!("wrote to stderr{}", stderr_suffix(Some(stderr))),
            ));
        }

        self.stdout
            .ok_or_else(|| TidyError::tool(tool, "produced no output stream"))
    }
}

fn stderr_suffix(stderr: Option<&[u8]>) -> String {
    match stderr {
        Some(bytes) if !bytes.is_empty() => {
            let text = crate::encoding::EncodingResolver::default()
                .resolve(bytes)
                .into_display_text();
            format!(": {}", text.trim_end())
        }
        _ => String::new(),
    }
}
