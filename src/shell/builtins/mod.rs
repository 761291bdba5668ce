//! Psh builtins
//!
//! The commands the shell runs itself instead of launching a process: the job
//! control commands, `hist`, `cd`, `quit` and `help`.

use self::prelude::*;

use self::dirs::Cd;
use self::exit::Quit;
use self::help::Help;
use self::history::Hist;
use self::jobs::{Halt, Ice, Procs, Wakeup};

pub mod prelude {
    pub use std::io::Write;

    pub use crate::core::intermediate_representation::Builtin;
    pub use crate::errors::{Error, ErrorKind, Result};
    pub use crate::shell::Shell;
}

mod dirs;
mod exit;
mod help;
mod history;
mod jobs;

/// Represents a Psh builtin command such as cd or help.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// The help string to display to the user.
    const HELP: &'static str;
    /// The usage string to display to the user.
    fn usage() -> String {
        Self::HELP.lines().next().unwrap_or_default().to_owned()
    }
    /// Runs the command with the given arguments in the `shell` environment.
    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()>;
}

/// Runs `builtin`. Arguments exclude the command name.
pub fn run(
    shell: &mut Shell,
    builtin: Builtin,
    args: &[String],
    stdout: &mut dyn Write,
) -> Result<()> {
    debug!("running builtin {} {:?}", builtin.name(), args);
    match builtin {
        Builtin::Cd => Cd::run(shell, args, stdout),
        Builtin::Halt => Halt::run(shell, args, stdout),
        Builtin::Help => Help::run(shell, args, stdout),
        Builtin::Hist => Hist::run(shell, args, stdout),
        Builtin::Ice => Ice::run(shell, args, stdout),
        Builtin::Procs => Procs::run(shell, args, stdout),
        Builtin::Quit => Quit::run(shell, args, stdout),
        Builtin::Wakeup => Wakeup::run(shell, args, stdout),
    }
}

/// Usage line of every builtin, in `Builtin::ALL` order.
fn usage(builtin: Builtin) -> String {
    match builtin {
        Builtin::Cd => Cd::usage(),
        Builtin::Halt => Halt::usage(),
        Builtin::Help => Help::usage(),
        Builtin::Hist => Hist::usage(),
        Builtin::Ice => Ice::usage(),
        Builtin::Procs => Procs::usage(),
        Builtin::Quit => Quit::usage(),
        Builtin::Wakeup => Wakeup::usage(),
    }
}

fn help(builtin: Builtin) -> &'static str {
    match builtin {
        Builtin::Cd => Cd::HELP,
        Builtin::Halt => Halt::HELP,
        Builtin::Help => Help::HELP,
        Builtin::Hist => Hist::HELP,
        Builtin::Ice => Ice::HELP,
        Builtin::Procs => Procs::HELP,
        Builtin::Quit => Quit::HELP,
        Builtin::Wakeup => Wakeup::HELP,
    }
}
