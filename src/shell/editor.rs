//! Thin line-reading wrapper around rustyline.

use std::fmt;

use failure::{Fail, ResultExt};
use rustyline::{
    self,
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    CompletionType, Config, Helper,
};

use crate::errors::{ErrorKind, Result};

struct EditorHelper(FilenameCompleter);

impl Completer for EditorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> ::std::result::Result<(usize, Vec<Pair>), ReadlineError> {
        self.0.complete(line, pos, ctx)
    }
}

impl Hinter for EditorHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for EditorHelper {}

impl Validator for EditorHelper {}

impl Helper for EditorHelper {}

/// Reads command lines with filename completion and in-memory history.
pub struct Editor {
    inner: rustyline::Editor<EditorHelper>,
}

impl Editor {
    pub fn new() -> Result<Editor> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .build();
        let mut inner = rustyline::Editor::with_config(config).context(ErrorKind::Readline)?;
        inner.set_helper(Some(EditorHelper(FilenameCompleter::new())));
        Ok(Editor { inner })
    }

    /// Reads the next line, without its terminator.
    ///
    /// Returns `None` at end of input. An interrupt at the prompt yields an
    /// empty line so the caller simply re-prompts.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.inner.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.inner.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(err) => Err(err.context(ErrorKind::Readline).into()),
        }
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Editor {{ history: {} entries }}", self.inner.history().len())
    }
}
