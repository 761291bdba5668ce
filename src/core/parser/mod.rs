//! PSH Parser

use crate::errors::{Error, Result};

use self::grammar::LineParser;

pub mod ast;

lalrpop_mod!(
    #[allow(clippy::all, dead_code, unused_qualifications)]
    grammar,
    "/core/parser/grammar.rs"
);

/// A raw input line together with its syntax tree.
#[derive(Debug)]
pub struct Command {
    pub input: String,
    pub inner: ast::Line,
}

impl Command {
    /// Returns `None` for blank lines.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let result = LineParser::new()
            .parse(input)
            .map_err(|_| Error::syntax(input))
            .map(|inner| Command {
                input: input.into(),
                inner,
            });
        debug!("parsed Command: {:?}", result);
        result.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_none() {
        assert!(Command::parse("").unwrap().is_none());
        assert!(Command::parse("   \t").unwrap().is_none());
    }

    #[test]
    fn syntax_errors() {
        assert!(Command::parse("| wc").is_err());
        assert!(Command::parse("ls |").is_err());
        assert!(Command::parse("&").is_err());
    }

    #[test]
    fn keeps_input() {
        let command = Command::parse("echo hi").unwrap().unwrap();
        assert_eq!(command.input, "echo hi");
        assert_eq!(command.inner.first.words, vec!["echo", "hi"]);
    }
}
