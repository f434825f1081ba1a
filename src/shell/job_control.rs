//! Registry of outstanding background process ids.

use std::fmt;

use log::{debug, warn};
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::core::status::ExitOutcome;

/// Tracks background children from spawn until their completion is observed.
///
/// The table is a set: a pid is never present twice, because pids stay unique
/// while the child remains unreaped.
#[derive(Default)]
pub struct JobTable {
    pids: Vec<Pid>,
}

impl JobTable {
    /// Registers a freshly spawned background child.
    ///
    /// # Panics
    /// Debug builds panic if `pid` is already tracked.
    pub fn add(&mut self, pid: Pid) {
        debug_assert!(!self.contains(pid));
        debug!("tracking background pid {}", pid);
        self.pids.push(pid);
    }

    /// Removes a tracked pid; no-op if absent.
    pub fn remove(&mut self, pid: Pid) {
        self.pids.retain(|&tracked| tracked != pid);
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    /// Non-blocking completion scan.
    ///
    /// Every tracked pid gets a `waitpid(WNOHANG)` check; children that have
    /// not exited are left untouched. The scan never mutates the table:
    /// completions are collected in a first pass and removed in a second.
    pub fn poll_completed(&mut self) -> Vec<(Pid, ExitOutcome)> {
        let mut completed = Vec::new();
        let mut stale = Vec::new();

        for &pid in &self.pids {
            match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => {}
                Ok(ref status) => {
                    if let Some(outcome) = ExitOutcome::from_wait_status(status) {
                        completed.push((pid, outcome));
                    }
                }
                Err(err) => {
                    // Nothing left to reap for this pid; stop tracking it.
                    warn!("waitpid({}) failed: {}", pid, err);
                    stale.push(pid);
                }
            }
        }

        for &(pid, _) in &completed {
            self.remove(pid);
        }
        for pid in stale {
            self.remove(pid);
        }
        completed
    }

    /// Delivers `signal` to every tracked pid and clears the table. Used at
    /// shutdown; does not wait for the children to actually die.
    pub fn signal_all(&mut self, signal: Signal) {
        for &pid in &self.pids {
            debug!("sending {:?} to background pid {}", signal, pid);
            let result = signal::kill(pid, signal);
            log_if_err!(result, "kill({})", pid);
        }
        self.pids.clear();
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} background jobs: {:?}", self.pids.len(), self.pids)
    }
}

#[cfg(test)]
mod tests {
    use std::process::{Child, Command};
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn spawn(program: &str, args: &[&str]) -> (Child, Pid) {
        let child = Command::new(program)
            .args(args)
            .spawn()
            .expect("failed to spawn test child");
        let pid = Pid::from_raw(child.id() as i32);
        (child, pid)
    }

    fn poll_until_complete(table: &mut JobTable) -> Vec<(Pid, ExitOutcome)> {
        for _ in 0..500 {
            let completed = table.poll_completed();
            if !completed.is_empty() {
                return completed;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("no child completed within the polling window");
    }

    #[test]
    fn poll_reaps_only_exited_children() {
        let mut table = JobTable::default();
        let (_short, short_pid) = spawn("true", &[]);
        let (_long, long_pid) = spawn("sleep", &["30"]);
        table.add(short_pid);
        table.add(long_pid);
        assert_eq!(table.len(), 2);

        let completed = poll_until_complete(&mut table);
        assert_eq!(completed, vec![(short_pid, ExitOutcome::Exited(0))]);
        assert!(!table.contains(short_pid));
        assert!(table.contains(long_pid));

        signal::kill(long_pid, Signal::SIGTERM).unwrap();
        let completed = poll_until_complete(&mut table);
        assert_eq!(
            completed,
            vec![(long_pid, ExitOutcome::Signaled(Signal::SIGTERM as i32))]
        );
        assert!(table.is_empty());
    }

    #[test]
    fn poll_with_no_completions_leaves_table_unchanged() {
        let mut table = JobTable::default();
        let (_child, pid) = spawn("sleep", &["30"]);
        table.add(pid);

        assert!(table.poll_completed().is_empty());
        assert!(table.contains(pid));

        table.signal_all(Signal::SIGTERM);
        assert!(table.is_empty());
        // reap directly so the test process leaves no zombie behind
        wait::waitpid(pid, None).unwrap();
    }

    #[test]
    fn signal_all_hits_every_tracked_pid_once() {
        let mut table = JobTable::default();
        let (_first, first_pid) = spawn("sleep", &["30"]);
        let (_second, second_pid) = spawn("sleep", &["30"]);
        table.add(first_pid);
        table.add(second_pid);

        table.signal_all(Signal::SIGTERM);
        assert!(table.is_empty());

        for pid in [first_pid, second_pid].iter() {
            match wait::waitpid(*pid, None).unwrap() {
                WaitStatus::Signaled(_, Signal::SIGTERM, _) => {}
                other => panic!("expected SIGTERM death, got {:?}", other),
            }
        }
    }

    #[test]
    fn remove_is_a_noop_for_untracked_pids() {
        let mut table = JobTable::default();
        table.remove(Pid::from_raw(99_999));
        assert!(table.is_empty());
    }
}
