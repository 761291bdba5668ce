use nix::unistd;

use super::prelude::*;
use super::BuiltinCommand;

pub struct Cd;

impl BuiltinCommand for Cd {
    const NAME: &'static str = Builtin::Cd.name();

    const HELP: &'static str = "\
cd: cd <dir>
    Change the current directory to DIR. The working directory is left
    unchanged if DIR cannot be entered.";

    fn run(_shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let dir = match args.first() {
            Some(dir) => dir,
            None => {
                return Err(Error::builtin_command(
                    format!("{}: missing directory", Self::NAME),
                    1,
                ))
            }
        };

        unistd::chdir(dir.as_str())
            .map_err(|e| Error::builtin_command(format!("{}: {}: {}", Self::NAME, dir, e), 1))?;
        debug!("changed directory to {}", dir);
        Ok(())
    }
}
