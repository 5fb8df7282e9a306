//! Error types for client sources.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while obtaining client-listing output.
///
/// Every variant renders as a message suitable for the dashboard's error
/// banner.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The program does not exist.
    #[error("{command}: command not found")]
    NotFound { command: String },

    /// The program exists but could not be executed.
    #[error("{command}: permission denied")]
    PermissionDenied { command: String },

    /// Spawning or waiting on the process failed for another reason.
    #[error("{command}: failed to run: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("{command}: {}", exit_detail(.code, .stderr))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The process did not finish within the timeout and was killed.
    #[error("{command}: timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// Stdout was not valid UTF-8.
    #[error("{command}: output is not valid UTF-8")]
    Decode { command: String },

    /// Reading captured output from disk failed.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InvocationError {
    /// Map a spawn-time I/O error onto the matching variant.
    pub fn from_spawn(command: impl Into<String>, err: io::Error) -> Self {
        let command = command.into();
        match err.kind() {
            io::ErrorKind::NotFound => InvocationError::NotFound { command },
            io::ErrorKind::PermissionDenied => InvocationError::PermissionDenied { command },
            _ => InvocationError::Spawn {
                command,
                source: err,
            },
        }
    }

    /// Check if this error was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InvocationError::Timeout { .. })
    }
}

fn exit_detail(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}
