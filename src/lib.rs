//! Msh - Mini Shell
//!
//! An interactive command interpreter that launches external programs with
//! optional stdin/stdout redirection and tracks background children until
//! they complete. A SIGTSTP-driven toggle switches the shell between normal
//! and foreground-only execution modes.

/// Logs the error variant of `$result` without consuming or propagating it.
/// Intended for fire-and-forget calls whose failure should not abort the
/// current operation.
macro_rules! log_if_err {
    ($result:expr) => {
        if let Err(ref err) = $result {
            log::error!("{}", err);
        }
    };
    ($result:expr, $($arg:tt)*) => {
        if let Err(ref err) = $result {
            log::error!("{}: {}", format!($($arg)*), err);
        }
    };
}

pub mod core;
pub mod errors;
pub mod shell;

pub use crate::core::command::CommandSpec;
pub use crate::core::status::{ExitOutcome, LastStatus};
pub use crate::shell::Shell;
