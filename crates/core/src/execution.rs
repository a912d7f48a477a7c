use std::process::{Command, ExitStatus, Stdio};

use log::info;

use crate::error::{Error, Result};

/// Starts the package manager and waits for it.
pub trait Launcher {
    /// Runs `program` with `arguments`, returning its exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or waited on.
    fn launch(&self, program: &str, arguments: &[String]) -> Result<i32>;
}

/// Runs the package manager as a child process sharing this process's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, program: &str, arguments: &[String]) -> Result<i32> {
        let mut command = Command::new(program);
        command.args(arguments);
        execute_command(command)
    }
}

/// Executes a command with inherited stdio and returns its exit code.
///
/// # Errors
///
/// Returns [`Error::Spawn`] if the command cannot be started.
pub fn execute_command(mut command: Command) -> Result<i32> {
    let program = command.get_program().to_string_lossy().into_owned();

    let command = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    info!("Executing {:?}", command);

    let status = command
        .spawn()
        .map_err(|original| Error::Spawn {
            program: program.clone(),
            original,
        })?
        .wait()?;

    Ok(exit_code(status))
}

/// The exit code a shell would report for `status`.
///
/// A child killed by a signal reports `128 + signal`.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
