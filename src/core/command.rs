//! Interprets an expanded token sequence as a structured command.

use std::path::PathBuf;

use crate::errors::{Error, Result};

const STDOUT_REDIRECT_TOKEN: &str = ">";
const STDIN_REDIRECT_TOKEN: &str = "<";
const BACKGROUND_TOKEN: &str = "&";
const COMMENT_PREFIX: char = '#';

/// A single parsed command line, ready for dispatch.
///
/// `args` never contains redirection operators, their filenames, or the
/// trailing background marker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandSpec {
    /// Program name followed by its arguments, in input order.
    pub args: Vec<String>,
    /// True only when the user requested `&` and foreground-only mode is off.
    pub background: bool,
    pub stdin_redirect: Option<PathBuf>,
    pub stdout_redirect: Option<PathBuf>,
}

impl CommandSpec {
    /// Builds a spec from expanded tokens.
    ///
    /// Returns `Ok(None)` for blank lines, comment lines, and lines that
    /// reduce to no program at all (e.g. a lone `&`). A redirection operator
    /// with no following filename is a syntax error.
    ///
    /// `foreground_only` is sampled exactly once, here, when resolving the
    /// background bit.
    pub fn build(tokens: &[String], foreground_only: bool) -> Result<Option<CommandSpec>> {
        let first = match tokens.first() {
            Some(token) => token,
            None => return Ok(None),
        };
        if first.is_empty() || first.starts_with(COMMENT_PREFIX) {
            return Ok(None);
        }

        let mut tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

        // The marker has positional significance only at end-of-line; any
        // other `&` stays a literal argument.
        let requested_background = tokens.last() == Some(&BACKGROUND_TOKEN);
        if requested_background {
            tokens.pop();
        }

        let mut spec = CommandSpec {
            background: requested_background && !foreground_only,
            ..Default::default()
        };

        let mut i = 0;
        while i < tokens.len() {
            match tokens[i] {
                STDOUT_REDIRECT_TOKEN => {
                    spec.stdout_redirect = Some(redirect_target(&tokens, i, "output")?);
                    i += 2;
                }
                STDIN_REDIRECT_TOKEN => {
                    spec.stdin_redirect = Some(redirect_target(&tokens, i, "input")?);
                    i += 2;
                }
                arg => {
                    spec.args.push(arg.to_string());
                    i += 1;
                }
            }
        }

        if spec.args.is_empty() {
            return Ok(None);
        }
        Ok(Some(spec))
    }
}

fn redirect_target(tokens: &[&str], operator_index: usize, direction: &str) -> Result<PathBuf> {
    tokens
        .get(operator_index + 1)
        .map(PathBuf::from)
        .ok_or_else(|| Error::syntax(format!("missing filename for {} redirection", direction)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn build(words: &[&str], foreground_only: bool) -> Result<Option<CommandSpec>> {
        CommandSpec::build(&tokens(words), foreground_only)
    }

    #[test]
    fn simple_command() {
        let spec = build(&["ls", "-la"], false).unwrap().unwrap();
        assert_eq!(spec.args, vec!["ls", "-la"]);
        assert!(!spec.background);
        assert!(spec.stdin_redirect.is_none());
        assert!(spec.stdout_redirect.is_none());
    }

    #[test]
    fn stdout_redirection_consumes_filename() {
        let spec = build(&["echo", "hello", ">", "out.txt"], false)
            .unwrap()
            .unwrap();
        assert_eq!(spec.args, vec!["echo", "hello"]);
        assert_eq!(spec.stdout_redirect, Some(PathBuf::from("out.txt")));
        assert!(spec.stdin_redirect.is_none());
        assert!(!spec.background);
    }

    #[test]
    fn both_redirections() {
        let spec = build(&["wc", "<", "in.txt", ">", "out.txt"], false)
            .unwrap()
            .unwrap();
        assert_eq!(spec.args, vec!["wc"]);
        assert_eq!(spec.stdin_redirect, Some(PathBuf::from("in.txt")));
        assert_eq!(spec.stdout_redirect, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn trailing_ampersand_requests_background() {
        let spec = build(&["sleep", "5", "&"], false).unwrap().unwrap();
        assert_eq!(spec.args, vec!["sleep", "5"]);
        assert!(spec.background);
    }

    #[test]
    fn foreground_only_mode_overrides_background_request() {
        let spec = build(&["sleep", "5", "&"], true).unwrap().unwrap();
        assert_eq!(spec.args, vec!["sleep", "5"]);
        assert!(!spec.background);
    }

    #[test]
    fn mid_line_ampersand_is_a_literal_argument() {
        let spec = build(&["echo", "&", "done"], false).unwrap().unwrap();
        assert_eq!(spec.args, vec!["echo", "&", "done"]);
        assert!(!spec.background);
    }

    #[test]
    fn missing_output_filename_is_a_parse_error() {
        let err = build(&["ls", ">"], false).unwrap_err();
        assert_eq!(
            format!("{}", err),
            "syntax error: missing filename for output redirection"
        );
    }

    #[test]
    fn missing_input_filename_is_a_parse_error() {
        let err = build(&["sort", "<"], false).unwrap_err();
        assert_eq!(
            format!("{}", err),
            "syntax error: missing filename for input redirection"
        );
    }

    #[test]
    fn blank_and_comment_lines_are_noops() {
        assert_eq!(build(&[], false).unwrap(), None);
        assert_eq!(build(&["#"], false).unwrap(), None);
        assert_eq!(build(&["#comment", "with", "args"], false).unwrap(), None);
    }

    #[test]
    fn lone_ampersand_reduces_to_a_noop() {
        assert_eq!(build(&["&"], false).unwrap(), None);
    }
}
