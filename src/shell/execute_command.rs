//! Spawns external commands and waits for foreground children.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use failure::Fail;
use log::debug;
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait;
use nix::unistd::Pid;

use crate::core::command::CommandSpec;
use crate::core::status::ExitOutcome;
use crate::errors::{ErrorKind, Result};
use crate::shell::job_control::JobTable;
use crate::shell::signals;

/// Result of dispatching one external command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LaunchOutcome {
    /// Child registered in the job table; the parent did not block.
    Backgrounded(Pid),
    /// Foreground child ran to completion.
    Completed(ExitOutcome),
    /// The program never started: a redirection target could not be opened,
    /// or the exec target does not exist. The message has already been
    /// printed; the failure counts as status 1 for a foreground command.
    SpawnFailed,
}

/// Launches `spec` as a child process.
///
/// Returns `Err(ErrorKind::Spawn)` only for process-creation failures, which
/// the caller treats as fatal; every per-command failure is reported through
/// `LaunchOutcome`.
pub fn launch(jobs: &mut JobTable, spec: &CommandSpec) -> Result<LaunchOutcome> {
    let (stdin, stdout) = match prepare_redirects(spec) {
        Some(io) => io,
        None => return Ok(LaunchOutcome::SpawnFailed),
    };

    let mut command = Command::new(&spec.args[0]);
    command.args(&spec.args[1..]).stdin(stdin).stdout(stdout);

    let background = spec.background;
    unsafe {
        command.pre_exec(move || {
            // Foreground children die on SIGINT, background children ignore
            // it; no child ever suspends on SIGTSTP.
            let interrupt = if background {
                SigHandler::SigIgn
            } else {
                SigHandler::SigDfl
            };
            signal::signal(Signal::SIGINT, interrupt).map_err(errno_to_io)?;
            signal::signal(Signal::SIGTSTP, SigHandler::SigIgn).map_err(errno_to_io)?;
            Ok(())
        });
    }

    let child = match command.spawn() {
        Ok(child) => child,
        Err(ref err) if is_exec_target_error(err) => {
            println!("{}: no such file or directory", spec.args[0]);
            return Ok(LaunchOutcome::SpawnFailed);
        }
        Err(err) => return Err(err.context(ErrorKind::Spawn).into()),
    };
    let pid = Pid::from_raw(child.id() as libc::pid_t);

    if background {
        println!("background pid is {}", pid);
        jobs.add(pid);
        return Ok(LaunchOutcome::Backgrounded(pid));
    }

    let outcome = wait_for_child(pid)?;
    Ok(LaunchOutcome::Completed(outcome))
}

/// Resolves the child's stdin/stdout handles.
///
/// A background command with no redirect gets the null device on both ends.
/// Both directions are attempted even when one fails, so every failing file
/// gets its own message; any failure abandons the launch.
fn prepare_redirects(spec: &CommandSpec) -> Option<(Stdio, Stdio)> {
    let stdin = match spec.stdin_redirect {
        Some(ref path) => match File::open(path) {
            Ok(file) => Some(Stdio::from(file)),
            Err(err) => {
                debug!("open {} for input failed: {}", path.display(), err);
                println!("cannot open {} for input", path.display());
                None
            }
        },
        None if spec.background => Some(Stdio::null()),
        None => Some(Stdio::inherit()),
    };

    let stdout = match spec.stdout_redirect {
        Some(ref path) => {
            let opened = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path);
            match opened {
                Ok(file) => Some(Stdio::from(file)),
                Err(err) => {
                    debug!("open {} for output failed: {}", path.display(), err);
                    println!("cannot open {} for output", path.display());
                    None
                }
            }
        }
        None if spec.background => Some(Stdio::null()),
        None => Some(Stdio::inherit()),
    };

    match (stdin, stdout) {
        (Some(stdin), Some(stdout)) => Some((stdin, stdout)),
        _ => None,
    }
}

/// Blocks until `pid` actually terminates, with SIGTSTP delivery to the
/// shell blocked for the duration. The wait is retried on interruption by
/// any unrelated signal; only the target's own termination exits the loop.
fn wait_for_child(pid: Pid) -> Result<ExitOutcome> {
    let _block = signals::SigtstpBlock::new()?;
    loop {
        match wait::waitpid(pid, None) {
            Ok(ref status) => {
                if let Some(outcome) = ExitOutcome::from_wait_status(status) {
                    return Ok(outcome);
                }
                debug!("ignoring non-terminal wait status for {}: {:?}", pid, status);
            }
            Err(Errno::EINTR) => continue,
            Err(err) => return Err(err.context(ErrorKind::Nix).into()),
        }
    }
}

fn is_exec_target_error(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound || err.kind() == io::ErrorKind::PermissionDenied
}

fn errno_to_io(errno: Errno) -> io::Error {
    io::Error::from_raw_os_error(errno as i32)
}
