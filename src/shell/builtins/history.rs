use super::prelude::*;
use super::BuiltinCommand;

pub struct Hist;

impl BuiltinCommand for Hist {
    const NAME: &'static str = Builtin::Hist.name();

    const HELP: &'static str = "\
hist: hist
    Display the history list with line numbers. `!!' repeats the last line
    and `!N' repeats line N of this list.";

    fn run(shell: &mut Shell, _args: &[String], stdout: &mut dyn Write) -> Result<()> {
        shell.history().list(stdout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellConfig;

    #[test]
    fn test_hist_includes_itself() {
        let mut shell = Shell::new(ShellConfig::interactive(20)).unwrap();
        let mut out = Vec::new();
        shell.execute_command_string("procs", &mut Vec::new()).unwrap();
        shell.execute_command_string("hist", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1: procs\n2: hist\n");
    }

    #[test]
    fn test_hist_keeps_last_twenty() {
        let mut shell = Shell::new(ShellConfig::interactive(20)).unwrap();
        for _ in 0..25 {
            shell.execute_command_string("procs", &mut Vec::new()).unwrap();
        }

        let mut out = Vec::new();
        Hist::run(&mut shell, &[], &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 20);
        assert!(out.starts_with("1: procs\n"));
        assert!(out.ends_with("20: procs\n"));
    }
}
