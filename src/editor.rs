use std::fmt;
use std::io::{self, BufRead};

use rustyline::{
    self,
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    CompletionType, Config, Helper,
};

use crate::errors::Result;

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
}

impl Highlighter for EditorHelper {}

impl Helper for EditorHelper {}

impl Validator for EditorHelper {}

/// Source of input lines: a line editor on a terminal, plain stdin otherwise.
pub struct Editor {
    terminal: Option<rustyline::Editor<EditorHelper, DefaultHistory>>,
}

impl Editor {
    pub fn new(interactive: bool) -> Result<Editor> {
        if !interactive {
            return Ok(Editor { terminal: None });
        }

        // psh keeps its own numbered history; rustyline's only feeds arrow keys
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(false)
            .completion_type(CompletionType::Circular)
            .build();

        let mut internal: rustyline::Editor<EditorHelper, DefaultHistory> =
            rustyline::Editor::with_config(config)?;
        internal.set_helper(Some(EditorHelper(FilenameCompleter::new())));
        Ok(Editor {
            terminal: Some(internal),
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Returns `None` when end of file is reached. An interrupted prompt
    /// yields an empty line. Bytes read from plain stdin that are not UTF-8
    /// are replaced rather than rejected.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.terminal {
            Some(ref mut internal) => match internal.readline(prompt) {
                Ok(line) => Ok(Some(line)),
                Err(ReadlineError::Eof) => Ok(None),
                Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
                Err(e) => Err(e.into()),
            },
            None => read_lossy_line(&mut io::stdin().lock()),
        }
    }

    pub fn add_history_entry(&mut self, line: &str) {
        if let Some(ref mut internal) = self.terminal {
            let temp_result = internal.add_history_entry(line);
            log_if_err!(temp_result, "failed to add {:?} to line editor history", line);
        }
    }

    pub fn clear_history(&mut self) {
        if let Some(ref mut internal) = self.terminal {
            let temp_result = internal.clear_history();
            log_if_err!(temp_result, "failed to clear line editor history");
        }
    }
}

fn read_lossy_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Editor {{ terminal: {} }}", self.is_terminal())
    }
}
