//! Msh builtins
//!
//! Commands the shell handles itself instead of spawning a child. Builtins
//! never update the last foreground status.

use std::io::Write;

use crate::core::command::CommandSpec;
use crate::errors::Result;
use crate::shell::shell::Shell;

use self::cd::Cd;
use self::exit::Exit;
use self::status::Status;

mod cd;
mod exit;
mod status;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const STATUS_NAME: &str = "status";

/// Represents an Msh builtin command such as cd or status.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()>;
}

pub fn is_builtin<T: AsRef<str>>(program: T) -> bool {
    [CD_NAME, EXIT_NAME, STATUS_NAME].contains(&program.as_ref())
}

/// precondition: `spec.args[0]` is a builtin.
pub fn run(shell: &mut Shell, spec: &CommandSpec, stdout: &mut dyn Write) -> Result<()> {
    debug_assert!(is_builtin(&spec.args[0]));

    let args = &spec.args[1..];
    match spec.args[0].as_str() {
        CD_NAME => Cd::run(shell, args, stdout),
        EXIT_NAME => Exit::run(shell, args, stdout),
        STATUS_NAME => Status::run(shell, args, stdout),
        _ => unreachable!(),
    }
}
