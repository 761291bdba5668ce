use super::prelude::*;
use super::BuiltinCommand;

pub struct Quit;

impl BuiltinCommand for Quit {
    const NAME: &'static str = Builtin::Quit.name();

    const HELP: &'static str = "\
quit: quit
    Exit the shell with a status of 0. Background jobs keep running.";

    fn run(shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        if !args.is_empty() {
            warn!("{}: ignoring arguments {:?}", Self::NAME, args);
        }
        shell.exit(0);
    }
}
