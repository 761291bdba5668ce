//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

#![allow(deprecated)]

use std::io;

use docopt;
use nix;
use rustyline::error::ReadlineError;

error_chain! {
    foreign_links {
        Docopt(docopt::Error);
        Io(io::Error);
        Nix(nix::Error);
        Readline(ReadlineError);
    }

    errors {
        Syntax(line: String) {
            description("syntax error")
            display("syntax error near: '{}'", line)
        }
        BuiltinCommand(message: String, code: i32) {
            description("builtin command error")
            display("{}", message)
        }
        InvalidPipeline(message: String) {
            description("invalid pipeline")
            display("{}", message)
        }
        EmptyHistory {
            description("no history is available")
            display("no history is available")
        }
        HistoryEntryNotFound(n: isize) {
            description("history entry does not exist")
            display("history number {} does not exist", n)
        }
        NoSuchJob(pid: String) {
            description("no such job")
            display("{}: no such job", pid)
        }
        Fork(stage: String) {
            description("fork failed")
            display("fork failed for {}", stage)
        }
        Pipe {
            description("pipe creation failed")
            display("pipe creation failed")
        }
    }
}

impl Error {
    pub(crate) fn syntax<T: AsRef<str>>(line: T) -> Error {
        ErrorKind::Syntax(line.as_ref().to_string()).into()
    }

    pub(crate) fn builtin_command<T: AsRef<str>>(message: T, code: i32) -> Error {
        ErrorKind::BuiltinCommand(message.as_ref().to_string(), code).into()
    }

    pub(crate) fn no_such_job<T: AsRef<str>>(pid: T) -> Error {
        ErrorKind::NoSuchJob(pid.as_ref().to_string()).into()
    }

    /// Errors after which the shell cannot keep running: the session state
    /// may already be inconsistent with the processes it launched.
    pub fn is_fatal(&self) -> bool {
        match *self.kind() {
            ErrorKind::Fork(_) | ErrorKind::Pipe => true,
            _ => false,
        }
    }

    /// Exit code a builtin reports for this error.
    pub fn code(&self) -> i32 {
        match *self.kind() {
            ErrorKind::BuiltinCommand(_, code) => code,
            ErrorKind::Syntax(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors() {
        assert!(Error::from(ErrorKind::Pipe).is_fatal());
        assert!(Error::from(ErrorKind::Fork("cat".into())).is_fatal());
        assert!(!Error::syntax("| wc").is_fatal());
        assert!(!Error::from(ErrorKind::EmptyHistory).is_fatal());
    }

    #[test]
    fn builtin_error_code() {
        let e = Error::builtin_command("halt: missing process-id", 2);
        assert_eq!(e.code(), 2);
        assert_eq!(e.to_string(), "halt: missing process-id");
        assert_eq!(Error::syntax("<").code(), 2);
    }
}
