//! running translated command lines

use std::io::{self, ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use super::error::ExecError;
use super::translate::CommandLine;

/// runs a command line and returns its standard output
///
/// implementations must be usable from several worker threads at once
pub trait Executor: Send + Sync {
    fn run(&self, cmd: &CommandLine) -> Result<String, ExecError>;
}

/// executes programs directly, without a shell
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn run(&self, cmd: &CommandLine) -> Result<String, ExecError> {
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(if cmd.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: cmd.program.clone(),
                source,
            })?;

        // stdin is written from its own thread while stdout and stderr drain
        let (output, written) = thread::scope(|scope| {
            let writer = match (&cmd.stdin, child.stdin.take()) {
                (Some(input), Some(mut stdin)) => Some(scope.spawn(move || {
                    // a program that exits without reading stdin is judged by its exit status
                    match stdin.write_all(input.as_bytes()) {
                        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                        result => result,
                    }
                })),
                _ => None,
            };
            let output = child.wait_with_output();
            let written = match writer {
                Some(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked"))),
                None => Ok(()),
            };
            (output, written)
        });

        let output = output.map_err(|source| ExecError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;
        written.map_err(|source| ExecError::Stdin {
            program: cmd.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            Ok(stdout)
        } else {
            Err(ExecError::NonZeroExit {
                code: output.status.code(),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}
