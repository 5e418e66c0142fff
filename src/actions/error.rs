//! action error types

use std::io;

use thiserror::Error;

use super::route::HeaderFieldKey;

/// failure to turn an HTTP request into an `Action`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown route: {method} {path}")]
    UnknownRoute { method: String, path: String },

    #[error("device udid missing or corrupt")]
    MissingOrInvalidDeviceId,

    #[error("header field '{0}' missing or corrupt")]
    MissingOrInvalidField(HeaderFieldKey),

    #[error("request body could not be decoded: {0}")]
    MalformedBody(String),
}

/// failure to run an external command
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write stdin of '{program}': {source}")]
    Stdin {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{}", describe_exit(*code, stderr, stdout))]
    NonZeroExit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn describe_exit(code: Option<i32>, stderr: &str, stdout: &str) -> String {
    let status = match code {
        Some(code) => format!("command exited with status {}", code),
        None => "command terminated by signal".to_string(),
    };
    let detail = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    if detail.is_empty() {
        status
    } else {
        format!("{}: {}", status, detail)
    }
}

/// error returned by a server-side action handler
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// the handler refused the action
    #[error("{0}")]
    Rejected(String),
}

impl ActionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ActionError::Rejected(message.into())
    }
}
