//! Splits an input line into tokens and expands the `$$` PID marker.

use nix::unistd::Pid;

/// The two-character literal replaced by the shell's own process id.
const PID_MARKER: &str = "$$";

/// Splits `line` on runs of space/newline characters, discarding empty
/// fields, and expands every `$$` occurrence in every token.
///
/// Each returned token owns its storage, so one token's expansion can never
/// alias another's.
pub fn tokenize(line: &str, shell_pid: Pid) -> Vec<String> {
    line.split(|c| c == ' ' || c == '\n')
        .filter(|word| !word.is_empty())
        .map(|word| expand_pid(word, shell_pid))
        .collect()
}

/// Replaces every occurrence of `$$` in `word` with the decimal
/// representation of `shell_pid`. Words without the marker pass through
/// unchanged.
pub fn expand_pid(word: &str, shell_pid: Pid) -> String {
    if word.contains(PID_MARKER) {
        word.replace(PID_MARKER, &shell_pid.to_string())
    } else {
        word.to_string()
    }
}
