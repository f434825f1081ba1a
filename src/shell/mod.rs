pub use self::shell::Shell;

pub mod builtins;
pub mod editor;
pub mod execute_command;
pub mod job_control;
pub mod shell;
pub mod signals;
