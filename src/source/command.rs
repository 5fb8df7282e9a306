//! Process-based data source.
//!
//! Runs `chronyc clients` (through `sudo -n` by default) and captures
//! stdout.

use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{ClientSource, InvocationError};
use crate::data::duration::format_duration;

/// Wall-clock limit for one invocation unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Time a timed-out command gets to exit after SIGTERM before SIGKILL.
const TERM_GRACE: Duration = Duration::from_millis(500);

/// A data source that runs an external command on every fetch.
///
/// The command runs with stdin closed. A run that outlives the timeout is
/// killed and reported as [`InvocationError::Timeout`].
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    sudo: bool,
    timeout: Duration,
    description: String,
}

impl CommandSource {
    /// Create a source for an arbitrary command, without sudo.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut source = Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            sudo: false,
            timeout: DEFAULT_TIMEOUT,
            description: String::new(),
        };
        source.description = format!("command: {}", source.command_line());
        source
    }

    /// `sudo -n chronyc clients` with the default timeout.
    pub fn chronyc() -> Self {
        Self::new("chronyc", ["clients"]).with_sudo(true)
    }

    /// Run the command through `sudo -n`.
    ///
    /// `-n` makes sudo fail immediately instead of waiting for a password.
    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self.description = format!("command: {}", self.command_line());
        self
    }

    /// Set the wall-clock limit for one invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The full command line as it will be executed.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.args.len() + 3);
        if self.sudo {
            parts.extend(["sudo", "-n"]);
        }
        parts.push(&self.program);
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }

    fn build(&self) -> Command {
        let mut cmd = if self.sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg("-n").arg(&self.program);
            cmd
        } else {
            Command::new(&self.program)
        };
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ClientSource for CommandSource {
    async fn fetch(&self) -> Result<String, InvocationError> {
        let command = self.command_line();
        let started = Instant::now();

        let mut child = self
            .build()
            .spawn()
            .map_err(|e| InvocationError::from_spawn(&command, e))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = timeout(self.timeout, async {
            tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(result) => result.map_err(|e| InvocationError::Spawn {
                command: command.clone(),
                source: e,
            })?,
            Err(_) => {
                warn!(%command, timeout = %format_duration(self.timeout), "command timed out");
                terminate(&mut child).await;
                return Err(InvocationError::Timeout {
                    command,
                    timeout: self.timeout,
                });
            }
        };

        debug!(%command, %status, elapsed = %format_duration(started.elapsed()), "command finished");

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            warn!(%command, %status, %stderr, "command failed");
            return Err(InvocationError::Exit {
                command,
                code: status.code(),
                stderr,
            });
        }

        String::from_utf8(stdout).map_err(|_| InvocationError::Decode { command })
    }

    fn description(&self) -> &str {
        &self.description
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Stop a timed-out child.
///
/// SIGTERM goes first because `sudo` relays it to the command it runs;
/// SIGKILL cannot be relayed and would leave `chronyc` behind. SIGKILL
/// follows only if the child ignores SIGTERM for [`TERM_GRACE`].
async fn terminate(child: &mut Child) {
    if request_exit(child) && timeout(TERM_GRACE, child.wait()).await.is_ok() {
        return;
    }
    if let Err(e) = child.kill().await {
        debug!(error = %e, "failed to kill timed-out command");
    }
}

#[cfg(unix)]
fn request_exit(child: &Child) -> bool {
    match child.id() {
        // SAFETY: `pid` is our own child and has not been reaped yet, so it
        // cannot have been reused.
        Some(pid) => unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 },
        None => false,
    }
}

#[cfg(not(unix))]
fn request_exit(_child: &Child) -> bool {
    false
}
