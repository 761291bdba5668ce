use nix::unistd::Pid;

use super::prelude::*;
use super::BuiltinCommand;
use crate::job_control;

pub struct Procs;

impl BuiltinCommand for Procs {
    const NAME: &'static str = Builtin::Procs.name();

    const HELP: &'static str = "\
procs: procs
    Display the status of jobs, most recent first.

    Jobs shown as Terminated are forgotten afterwards.";

    fn run(shell: &mut Shell, _args: &[String], stdout: &mut dyn Write) -> Result<()> {
        shell.jobs_mut().list(stdout)?;
        Ok(())
    }
}

pub struct Halt;

impl BuiltinCommand for Halt {
    const NAME: &'static str = Builtin::Halt.name();

    const HELP: &'static str = "\
halt: halt <pid>
    Suspend the job running as PID by sending it SIGSTOP.";

    fn run(shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let pid = parse_pid(Self::NAME, args)?;
        job_control::halt(shell.jobs_mut(), pid)
    }
}

pub struct Wakeup;

impl BuiltinCommand for Wakeup {
    const NAME: &'static str = Builtin::Wakeup.name();

    const HELP: &'static str = "\
wakeup: wakeup <pid>
    Resume the job running as PID by sending it SIGCONT.";

    fn run(shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let pid = parse_pid(Self::NAME, args)?;
        job_control::wakeup(shell.jobs_mut(), pid)
    }
}

pub struct Ice;

impl BuiltinCommand for Ice {
    const NAME: &'static str = Builtin::Ice.name();

    const HELP: &'static str = "\
ice: ice <pid>
    Interrupt the job running as PID by sending it SIGINT. The job is shown
    as Terminated from then on.";

    fn run(shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let pid = parse_pid(Self::NAME, args)?;
        job_control::ice(shell.jobs_mut(), pid)
    }
}

fn parse_pid(name: &str, args: &[String]) -> Result<Pid> {
    let arg = match args.first() {
        Some(arg) => arg,
        None => {
            return Err(Error::builtin_command(
                format!("{}: missing process-id", name),
                2,
            ))
        }
    };

    match arg.parse::<i32>() {
        Ok(n) if n > 0 => Ok(Pid::from_raw(n)),
        _ => Err(Error::builtin_command(
            format!("{}: {}: process-id is not valid", name, arg),
            1,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellConfig;

    fn run<B: BuiltinCommand>(shell: &mut Shell, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        B::run(shell, &args, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn spawn_sleeper(shell: &mut Shell) -> Pid {
        shell
            .execute_command_string("sleep 5 &", &mut Vec::new())
            .unwrap();
        shell.jobs().iter().next().unwrap().pid()
    }

    #[test]
    fn test_procs_empty() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        assert_eq!(
            run::<Procs>(&mut shell, &[]).unwrap(),
            "Index\tPID\tSTATUS\tCOMMAND\n"
        );
    }

    #[test]
    fn test_halt_wakeup_ice() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        let pid = spawn_sleeper(&mut shell);
        let pid_arg = pid.to_string();

        run::<Halt>(&mut shell, &[pid_arg.as_str()]).unwrap();
        let listing = run::<Procs>(&mut shell, &[]).unwrap();
        assert_eq!(
            listing,
            format!("Index\tPID\tSTATUS\tCOMMAND\n0\t{}\tSuspended\tsleep 5\n", pid)
        );

        run::<Wakeup>(&mut shell, &[pid_arg.as_str()]).unwrap();
        assert!(run::<Procs>(&mut shell, &[])
            .unwrap()
            .contains(&format!("0\t{}\tRunning\tsleep 5", pid)));

        run::<Ice>(&mut shell, &[pid_arg.as_str()]).unwrap();
        assert!(run::<Procs>(&mut shell, &[])
            .unwrap()
            .contains(&format!("0\t{}\tTerminated\tsleep 5", pid)));
        assert!(shell.jobs().is_empty());

        // the job is gone, so the pid is no longer a job
        match *run::<Halt>(&mut shell, &[pid_arg.as_str()]).unwrap_err().kind() {
            ErrorKind::NoSuchJob(_) => {}
            ref other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_pids() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();

        let err = run::<Halt>(&mut shell, &[]).unwrap_err();
        assert_eq!(err.to_string(), "halt: missing process-id");
        assert_eq!(err.code(), 2);

        for arg in &["abc", "0", "-3"] {
            let err = run::<Wakeup>(&mut shell, &[*arg]).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("wakeup: {}: process-id is not valid", arg)
            );
        }
    }
}
