use super::prelude::*;
use super::{help, usage, BuiltinCommand};

pub struct Help;

impl BuiltinCommand for Help {
    const NAME: &'static str = Builtin::Help.name();

    const HELP: &'static str = "\
help: help [command ...]
    Display helpful information about builtin commands. If COMMAND is specified,
    gives detailed help on all commands matching COMMAND, otherwise a list of the
    builtins is printed.";

    fn run(_shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()> {
        if args.is_empty() {
            for builtin in &Builtin::ALL {
                writeln!(stdout, "{}", usage(*builtin))?;
            }
            return Ok(());
        }

        let mut all_invalid = true;
        for arg in args {
            if let Some(builtin) = Builtin::from_name(arg) {
                writeln!(stdout, "{}", help(builtin))?;
                all_invalid = false;
            }
        }

        if all_invalid {
            let topic = args.last().map(String::as_str).unwrap_or_default();
            return Err(Error::builtin_command(
                format!("{}: no help topics match {}", Self::NAME, topic),
                1,
            ));
        }

        Ok(())
    }
}
