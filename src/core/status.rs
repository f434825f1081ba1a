//! Termination outcomes and the last-foreground-status tracker.

use std::fmt;

use nix::sys::wait::WaitStatus;

/// How a child process terminated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitOutcome {
    /// Normal exit with the given status code.
    Exited(i32),
    /// Terminated by the given signal number.
    Signaled(i32),
}

impl ExitOutcome {
    /// Converts a reaped wait status; `None` for statuses that do not
    /// represent termination (e.g. a stopped child).
    pub fn from_wait_status(status: &WaitStatus) -> Option<ExitOutcome> {
        match *status {
            WaitStatus::Exited(_, code) => Some(ExitOutcome::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ExitOutcome::Signaled(signal as i32)),
            _ => None,
        }
    }

    /// Shell-style status code: the exit value, or 128 + signal number for a
    /// signal termination.
    pub fn code(&self) -> i32 {
        match *self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(signal) => 128 + signal,
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExitOutcome::Exited(code) => write!(f, "exit value {}", code),
            ExitOutcome::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

/// The most recent foreground command's termination outcome.
///
/// Overwritten after every foreground command; background completions report
/// independently and never touch it.
#[derive(Clone, Copy, Debug)]
pub struct LastStatus {
    outcome: ExitOutcome,
}

impl LastStatus {
    pub fn record(&mut self, outcome: ExitOutcome) {
        self.outcome = outcome;
    }

    pub fn outcome(&self) -> ExitOutcome {
        self.outcome
    }

    pub fn was_signaled(&self) -> bool {
        match self.outcome {
            ExitOutcome::Signaled(_) => true,
            ExitOutcome::Exited(_) => false,
        }
    }

    pub fn code(&self) -> i32 {
        self.outcome.code()
    }
}

impl Default for LastStatus {
    fn default() -> LastStatus {
        LastStatus {
            outcome: ExitOutcome::Exited(0),
        }
    }
}

impl fmt::Display for LastStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.outcome.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_successful_exit() {
        let status = LastStatus::default();
        assert_eq!(status.outcome(), ExitOutcome::Exited(0));
        assert!(!status.was_signaled());
        assert_eq!(format!("{}", status), "exit value 0");
    }

    #[test]
    fn record_overwrites_in_place() {
        let mut status = LastStatus::default();
        status.record(ExitOutcome::Exited(1));
        assert_eq!(format!("{}", status), "exit value 1");

        status.record(ExitOutcome::Signaled(15));
        assert!(status.was_signaled());
        assert_eq!(format!("{}", status), "terminated by signal 15");
    }

    #[test]
    fn signal_termination_maps_to_128_plus_signo() {
        assert_eq!(ExitOutcome::Exited(3).code(), 3);
        assert_eq!(ExitOutcome::Signaled(2).code(), 130);
    }
}
