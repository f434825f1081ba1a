use std::path::PathBuf;
use std::process;

use docopt::Docopt;
use log::debug;
use nix::unistd::Pid;
use serde_derive::Deserialize;

use msh::errors::Error;
use msh::Shell;

const LOG_FILE_NAME: &str = ".msh_log";

const USAGE: &str = "
msh.

Usage:
    msh [options]
    msh [options] -c <command>
    msh (-h | --help)
    msh --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -c              If the -c option is present, then commands are read from
                        the first non-option argument command_string.
    --log=<path>    File to write log to, defaults to ~/.msh_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    init_logger(&args.flag_log);
    debug!("{:?}", args);

    if args.flag_version {
        println!("msh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c {
        execute_from_command_string(&args);
    } else {
        execute_from_stdin();
    }
}

fn init_logger(path: &Option<String>) {
    let log_path = path
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path);

    // The shell still works without a log file.
    let log_file = match fern::log_file(&log_path) {
        Ok(file) => file,
        Err(_) => return,
    };

    let pid = Pid::this();
    let result = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(log_file)
        .apply();
    if let Err(e) = result {
        eprintln!("msh: failed to initialize logging: {}", e);
    }
}

fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
}

fn execute_from_command_string(args: &Args) -> ! {
    let command = args
        .arg_command
        .as_ref()
        .expect("docopt guarantees <command> when -c is present");

    let mut shell = Shell::new().unwrap_or_else(|e| display_error_and_exit(&e));
    let result = shell.execute_command_string(command);
    shell.report_completed_jobs();
    shell.terminate_background_jobs();

    if let Err(e) = result {
        eprintln!("msh: {}", e);
        shell.exit(Some(1));
    }
    let code = shell.last_status().code();
    shell.exit(Some(code));
}

fn execute_from_stdin() -> ! {
    let mut shell = Shell::new().unwrap_or_else(|e| display_error_and_exit(&e));
    let result = shell.run();
    if let Err(e) = result {
        eprintln!("msh: {}", e);
        shell.exit(Some(1));
    }
    shell.exit(None)
}

fn display_error_and_exit(error: &Error) -> ! {
    eprintln!("msh: {}", error);
    process::exit(1);
}
