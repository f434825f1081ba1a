//! Shell-process signal dispositions and the foreground-only flag.
//!
//! The flag is owned here and toggled exclusively by the SIGTSTP handler.
//! Handlers restrict themselves to atomic ops and `write(2)`; no allocation
//! happens in signal context. Child dispositions are configured at spawn
//! time in `execute_command`, not here.

use std::sync::atomic::{AtomicBool, Ordering};

use failure::ResultExt;
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::unistd;

use crate::errors::{ErrorKind, Result};

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_NOTICE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_NOTICE: &[u8] = b"\nExiting foreground-only mode\n";

/// Installs the shell's SIGINT and SIGTSTP handlers. Handlers run with all
/// signals masked and restart interrupted syscalls; the foreground wait loop
/// still retries on EINTR for waits that are not restarted.
pub fn install() -> Result<()> {
    let sigint_action = SigAction::new(
        SigHandler::Handler(handle_sigint),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );
    let sigtstp_action = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );
    unsafe {
        signal::sigaction(Signal::SIGINT, &sigint_action).context(ErrorKind::Nix)?;
        signal::sigaction(Signal::SIGTSTP, &sigtstp_action).context(ErrorKind::Nix)?;
    }
    Ok(())
}

/// Current state of the foreground-only toggle.
pub fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

extern "C" fn handle_sigint(_: libc::c_int) {
    // No state change; just push the next prompt onto a fresh line.
    write_raw(b"\n");
}

extern "C" fn handle_sigtstp(_: libc::c_int) {
    let entering = !FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    if entering {
        write_raw(ENTER_NOTICE);
    } else {
        write_raw(EXIT_NOTICE);
    }
}

fn write_raw(buf: &[u8]) {
    // write(2) is async-signal-safe; a failed write here is unreportable
    let _ = unistd::write(libc::STDOUT_FILENO, buf);
}

/// RAII guard blocking SIGTSTP delivery for its lifetime, so a user ^Z during
/// a foreground wait cannot interrupt the shell's own wait.
#[derive(Debug)]
pub struct SigtstpBlock {
    _private: (),
}

impl SigtstpBlock {
    pub fn new() -> Result<SigtstpBlock> {
        signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&sigtstp_set()), None)
            .context(ErrorKind::Nix)?;
        Ok(SigtstpBlock { _private: () })
    }
}

impl Drop for SigtstpBlock {
    fn drop(&mut self) {
        let result = signal::sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&sigtstp_set()), None);
        log_if_err!(result, "failed to unblock SIGTSTP");
    }
}

fn sigtstp_set() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGTSTP);
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    // Covers the default state too: raise(3) delivers to the calling thread
    // before returning, and toggling twice leaves the flag off for the rest
    // of the test run.
    #[test]
    fn sigtstp_toggles_foreground_only_mode() {
        install().unwrap();
        assert!(!foreground_only());

        signal::raise(Signal::SIGTSTP).unwrap();
        assert!(foreground_only());

        signal::raise(Signal::SIGTSTP).unwrap();
        assert!(!foreground_only());
    }

    #[test]
    fn block_guard_masks_sigtstp_for_its_lifetime() {
        {
            let _guard = SigtstpBlock::new().unwrap();
            let mask = SigSet::thread_get_mask().unwrap();
            assert!(mask.contains(Signal::SIGTSTP));
        }
        let mask = SigSet::thread_get_mask().unwrap();
        assert!(!mask.contains(Signal::SIGTSTP));
    }
}
