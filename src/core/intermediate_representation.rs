use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::parser::{self, ast};
use crate::errors::{Error, Result};
use crate::util;

/// One program invocation, optionally linked to the stage it pipes into.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandDescriptor {
    /// `argv[0]` is the program name.
    argv: Vec<String>,
    input_redirect: Option<PathBuf>,
    output_redirect: Option<PathBuf>,
    blocking: bool,
    next: Option<Box<CommandDescriptor>>,
}

impl CommandDescriptor {
    /// # Panics
    /// Panics if `argv` is empty.
    pub fn new<S: AsRef<str>>(argv: &[S]) -> Self {
        assert!(!argv.is_empty(), "argv must contain the program name");
        Self {
            argv: argv.iter().map(|s| s.as_ref().to_string()).collect(),
            input_redirect: None,
            output_redirect: None,
            blocking: true,
            next: None,
        }
    }

    pub fn with_input_redirect<P: Into<PathBuf>>(self, path: P) -> Self {
        Self {
            input_redirect: Some(path.into()),
            ..self
        }
    }

    pub fn with_output_redirect<P: Into<PathBuf>>(self, path: P) -> Self {
        Self {
            output_redirect: Some(path.into()),
            ..self
        }
    }

    pub fn with_blocking(self, blocking: bool) -> Self {
        Self { blocking, ..self }
    }

    pub fn with_next(self, next: CommandDescriptor) -> Self {
        Self {
            next: Some(Box::new(next)),
            ..self
        }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn input_redirect(&self) -> Option<&Path> {
        self.input_redirect.as_ref().map(PathBuf::as_path)
    }

    pub fn output_redirect(&self) -> Option<&Path> {
        self.output_redirect.as_ref().map(PathBuf::as_path)
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn next(&self) -> Option<&CommandDescriptor> {
        self.next.as_ref().map(|n| &**n)
    }

    /// Detaches the next stage, leaving this descriptor a single command.
    pub fn take_next(&mut self) -> Option<CommandDescriptor> {
        self.next.take().map(|n| *n)
    }
}

impl fmt::Display for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", util::join_argv(&self.argv))
    }
}

/// The commands the shell runs itself instead of launching a process.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Builtin {
    Cd,
    Halt,
    Help,
    Hist,
    Ice,
    Procs,
    Quit,
    Wakeup,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Cd,
        Builtin::Halt,
        Builtin::Help,
        Builtin::Hist,
        Builtin::Ice,
        Builtin::Procs,
        Builtin::Quit,
        Builtin::Wakeup,
    ];

    pub fn from_name<S: AsRef<str>>(name: S) -> Option<Builtin> {
        Builtin::ALL
            .iter()
            .cloned()
            .find(|builtin| builtin.name() == name.as_ref())
    }

    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Halt => "halt",
            Builtin::Help => "help",
            Builtin::Hist => "hist",
            Builtin::Ice => "ice",
            Builtin::Procs => "procs",
            Builtin::Quit => "quit",
            Builtin::Wakeup => "wakeup",
        }
    }
}

/// What a parsed line asks the shell to do.
#[derive(Debug, PartialEq)]
pub enum Input {
    Builtin { builtin: Builtin, args: Vec<String> },
    Single(CommandDescriptor),
    /// The descriptor's `next` holds the second stage.
    Pipeline(CommandDescriptor),
}

#[derive(Debug)]
pub struct Interpreter;

impl Interpreter {
    /// Returns `None` for blank lines.
    pub fn parse_line(line: &str) -> Result<Option<Input>> {
        match parser::Command::parse(line)? {
            Some(command) => Interpreter::parse(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn parse(command: parser::Command) -> Result<Input> {
        let ast::Line {
            first,
            second,
            background,
        } = command.inner;

        let first = descriptor_from_simple_command(&command.input, first, !background)?;
        match second {
            Some(second) => {
                let second =
                    descriptor_from_simple_command(&command.input, second, !background)?;
                Ok(Input::Pipeline(first.with_next(second)))
            }
            None => match Builtin::from_name(first.program()) {
                Some(builtin) => {
                    if first.input_redirect().is_some() || first.output_redirect().is_some() {
                        warn!("ignoring redirects given to builtin {}", builtin.name());
                    }
                    Ok(Input::Builtin {
                        builtin,
                        args: first.argv()[1..].to_vec(),
                    })
                }
                None => Ok(Input::Single(first)),
            },
        }
    }
}

fn descriptor_from_simple_command(
    input: &str,
    command: ast::SimpleCommand,
    blocking: bool,
) -> Result<CommandDescriptor> {
    if command.words.is_empty() {
        return Err(Error::syntax(input));
    }

    let mut descriptor = CommandDescriptor::new(&command.words).with_blocking(blocking);
    for redirect in command.redirects {
        descriptor = match redirect.instruction {
            ast::RedirectInstruction::Input if descriptor.input_redirect.is_none() => {
                descriptor.with_input_redirect(redirect.filename)
            }
            ast::RedirectInstruction::Output if descriptor.output_redirect.is_none() => {
                descriptor.with_output_redirect(redirect.filename)
            }
            _ => return Err(Error::syntax(input)),
        };
    }

    Ok(descriptor)
}
