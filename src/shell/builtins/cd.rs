use std::env;
use std::io::Write;

use crate::errors::{Error, Result};
use crate::shell::builtins::{self, BuiltinCommand};
use crate::shell::shell::Shell;

pub struct Cd;

impl BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    fn run(_shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let dir = match args.first() {
            Some(dir) => dir.clone(),
            None => env::var("HOME")
                .map_err(|_| Error::builtin_command("cd: HOME not set", 1))?,
        };

        env::set_current_dir(&dir)
            .map_err(|e| Error::builtin_command(format!("cd: {}: {}", dir, e), 1))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;

    use super::*;

    #[test]
    fn changes_to_the_named_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("subdir");
        fs::create_dir(&target).unwrap();
        let target = target.canonicalize().unwrap();

        let mut shell = Shell::new().unwrap();
        let args = vec![target.to_string_lossy().into_owned()];
        Cd::run(&mut shell, &args, &mut io::sink()).unwrap();
        assert_eq!(env::current_dir().unwrap(), target);
    }

    #[test]
    fn missing_directory_reports_an_error() {
        let mut shell = Shell::new().unwrap();
        let args = vec!["/definitely/not/here".to_string()];
        assert!(Cd::run(&mut shell, &args, &mut io::sink()).is_err());
    }
}
