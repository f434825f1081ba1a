use std::io::Write;

use crate::errors::Result;
use crate::shell::builtins::{self, BuiltinCommand};
use crate::shell::shell::Shell;

pub struct Exit;

impl BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    fn run(shell: &mut Shell, _args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        shell.terminate_background_jobs();
        shell.exit(None);
    }
}
