use std::io::Write;

use failure::ResultExt;

use crate::errors::{ErrorKind, Result};
use crate::shell::builtins::{self, BuiltinCommand};
use crate::shell::shell::Shell;

pub struct Status;

impl BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    fn run(shell: &mut Shell, _args: &[String], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_status()).context(ErrorKind::Io)?;
        Ok(())
    }
}
