//! Msh - Shell Module
//!
//! The Shell owns the control loop: poll background jobs, read a line, build
//! a command spec, and dispatch it to a builtin or the process launcher.

use std::fmt;
use std::io;
use std::process;

use log::{debug, error, info};
use nix::sys::signal::Signal;
use nix::unistd::{self, Pid};

use crate::core::command::CommandSpec;
use crate::core::expansion;
use crate::core::status::{ExitOutcome, LastStatus};
use crate::errors::{ErrorKind, Result};
use crate::shell::{
    builtins,
    editor::Editor,
    execute_command::{self, LaunchOutcome},
    job_control::JobTable,
    signals,
};

const PROMPT: &str = ": ";
const COMMAND_FAILURE_EXIT_STATUS: i32 = 1;
const SPAWN_ERROR_EXIT_STATUS: i32 = 1;

/// Msh Shell
pub struct Shell {
    editor: Editor,
    jobs: JobTable,
    last_status: LastStatus,
    pid: Pid,
}

impl Shell {
    /// Constructs a new Shell and installs its signal dispositions.
    pub fn new() -> Result<Shell> {
        signals::install()?;
        let shell = Shell {
            editor: Editor::new()?,
            jobs: JobTable::default(),
            last_status: LastStatus::default(),
            pid: unistd::getpid(),
        };
        info!("msh started up (pid {})", shell.pid);
        Ok(shell)
    }

    /// Runs commands from stdin until end of input or `exit`.
    pub fn run(&mut self) -> Result<()> {
        loop {
            // Background completions become visible here, once per
            // iteration, immediately before the next prompt.
            self.report_completed_jobs();

            let line = match self.editor.readline(PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                e => {
                    log_if_err!(e, "readline");
                    continue;
                }
            };

            if let Err(e) = self.execute_command_string(&line) {
                if let ErrorKind::Spawn = *e.kind() {
                    eprintln!("msh: {}", e);
                    error!("fatal: {}", e);
                    process::exit(SPAWN_ERROR_EXIT_STATUS);
                }
                error!("execute_command_string: {}", e);
            }
        }

        // End of input behaves like `exit`: best-effort termination of any
        // jobs still tracked, without waiting on them.
        if self.has_background_jobs() {
            info!("end of input with background jobs still tracked");
        }
        self.terminate_background_jobs();
        Ok(())
    }

    /// Parses and dispatches a single command line.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let tokens = expansion::tokenize(input, self.pid);
        let spec = match CommandSpec::build(&tokens, signals::foreground_only()) {
            Ok(Some(spec)) => spec,
            Ok(None) => return Ok(()),
            Err(e) => {
                if let ErrorKind::Syntax(_) = *e.kind() {
                    eprintln!("msh: {}", e);
                    return Ok(());
                }
                return Err(e);
            }
        };

        if builtins::is_builtin(&spec.args[0]) {
            let result = builtins::run(self, &spec, &mut io::stdout());
            if let Err(e) = result {
                eprintln!("msh: {}", e);
            }
            return Ok(());
        }

        self.execute_external(&spec)
    }

    fn execute_external(&mut self, spec: &CommandSpec) -> Result<()> {
        match execute_command::launch(&mut self.jobs, spec)? {
            LaunchOutcome::Backgrounded(pid) => debug!("backgrounded pid {}", pid),
            LaunchOutcome::Completed(outcome) => {
                self.last_status.record(outcome);
                if self.last_status.was_signaled() {
                    println!("{}", self.last_status);
                }
            }
            LaunchOutcome::SpawnFailed => {
                if !spec.background {
                    self.last_status
                        .record(ExitOutcome::Exited(COMMAND_FAILURE_EXIT_STATUS));
                }
            }
        }
        Ok(())
    }

    /// Reports every background job whose completion is observable now.
    pub fn report_completed_jobs(&mut self) {
        for (pid, outcome) in self.jobs.poll_completed() {
            println!("background pid {} is done: {}", pid, outcome);
        }
    }

    /// Most recent foreground command's termination outcome.
    pub fn last_status(&self) -> &LastStatus {
        &self.last_status
    }

    /// Returns `true` if the shell has background jobs.
    pub fn has_background_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    /// Sends SIGTERM to every tracked background job, fire-and-forget.
    pub fn terminate_background_jobs(&mut self) {
        self.jobs.signal_all(Signal::SIGTERM);
    }

    /// Exits the shell with `code`, defaulting to 0.
    pub fn exit(&mut self, code: Option<i32>) -> ! {
        info!("msh shutting down");
        process::exit(code.unwrap_or(0));
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pid {}\t{:?}\t{:?}", self.pid, self.jobs, self.last_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_dispatch_nothing() {
        let mut shell = Shell::new().unwrap();
        shell.execute_command_string("").unwrap();
        shell.execute_command_string("   ").unwrap();
        shell.execute_command_string("# just a comment").unwrap();
        assert_eq!(shell.last_status().code(), 0);
    }

    #[test]
    fn foreground_failure_updates_last_status() {
        let mut shell = Shell::new().unwrap();
        shell.execute_command_string("false").unwrap();
        assert_eq!(shell.last_status().code(), 1);

        shell.execute_command_string("true").unwrap();
        assert_eq!(shell.last_status().code(), 0);
    }

    #[test]
    fn malformed_redirection_is_rejected_before_dispatch() {
        let mut shell = Shell::new().unwrap();
        // one reported line, no crash, status untouched
        shell.execute_command_string("ls >").unwrap();
        assert_eq!(shell.last_status().code(), 0);
    }

    #[test]
    fn background_jobs_are_tracked_until_terminated() {
        let mut shell = Shell::new().unwrap();
        assert!(!shell.has_background_jobs());

        let spec = CommandSpec {
            args: vec!["sleep".to_string(), "30".to_string()],
            background: true,
            ..CommandSpec::default()
        };
        shell.execute_external(&spec).unwrap();
        assert!(shell.has_background_jobs());

        shell.terminate_background_jobs();
        assert!(!shell.has_background_jobs());
    }

    #[test]
    fn missing_program_records_failure_status() {
        let mut shell = Shell::new().unwrap();
        shell
            .execute_command_string("msh_no_such_program_xyz")
            .unwrap();
        assert_eq!(shell.last_status().code(), 1);
    }
}
