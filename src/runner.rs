//! Runs the wrapped command and captures its combined output.

use crate::types::{CommandOutput, Completion, Result, SaydoneError};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time;
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 8 * 1024;

/// A program and its arguments, exactly as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Split a command line into program and arguments.
    ///
    /// Returns `None` for an empty list.
    pub fn from_args(words: &[String]) -> Option<Self> {
        let (program, args) = words.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Render for logs and notifications.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Executes commands with an optional wall-clock limit.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run the invocation to completion.
    ///
    /// A non-zero exit or a timeout is reported through [`Completion`], with
    /// whatever output was captured. Only a failure to start the program is
    /// returned as an error.
    pub async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| SaydoneError::SpawnError {
            program: invocation.program.clone(),
            source,
        })?;
        info!("Started `{}` (pid {:?})", invocation.display(), child.id());

        let mut output = Vec::new();
        let completion = match self.timeout {
            Some(limit) => {
                match time::timeout(limit, collect(&mut child, &mut output)).await {
                    Ok(status) => completion_from(status?),
                    Err(_) => {
                        warn!("`{}` exceeded timeout of {:?}, killing it", invocation.program, limit);
                        if let Err(e) = child.kill().await {
                            warn!("Failed to kill timed out command: {}", e);
                        }
                        Completion::TimedOut { after: limit }
                    }
                }
            }
            None => completion_from(collect(&mut child, &mut output).await?),
        };

        debug!("Captured {} bytes, completion: {:?}", output.len(), completion);
        Ok(CommandOutput { output, completion })
    }
}

fn completion_from(status: ExitStatus) -> Completion {
    if status.success() {
        Completion::Success
    } else {
        Completion::Failed {
            code: status.code(),
        }
    }
}

/// Drain stdout and stderr into `output` as bytes arrive, then wait for exit.
///
/// `output` lives outside the future so that a timeout keeps the partial
/// output.
async fn collect(child: &mut Child, output: &mut Vec<u8>) -> Result<ExitStatus> {
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut out_buf = vec![0u8; READ_CHUNK];
    let mut err_buf = vec![0u8; READ_CHUNK];

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            n = read_some(&mut stdout, &mut out_buf), if stdout.is_some() => {
                match n? {
                    0 => stdout = None,
                    n => output.extend_from_slice(&out_buf[..n]),
                }
            }
            n = read_some(&mut stderr, &mut err_buf), if stderr.is_some() => {
                match n? {
                    0 => stderr = None,
                    n => output.extend_from_slice(&err_buf[..n]),
                }
            }
        }
    }

    Ok(child.wait().await?)
}

async fn read_some<R: AsyncRead + Unpin>(
    stream: &mut Option<R>,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    match stream {
        Some(s) => s.read(buf).await,
        None => Ok(0),
    }
}
