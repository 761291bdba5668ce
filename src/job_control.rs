//! Stopping, resuming and interrupting tracked jobs.

use std::fmt;

use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};

use crate::{
    core::job::{JobStatus, ProcessTable},
    errors::{Error, Result},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobSignal {
    Halt,
    Wakeup,
    Ice,
}

impl JobSignal {
    fn signal(self) -> Signal {
        match self {
            JobSignal::Halt => Signal::SIGSTOP,
            JobSignal::Wakeup => Signal::SIGCONT,
            JobSignal::Ice => Signal::SIGINT,
        }
    }

    /// Status recorded once the signal was delivered.
    fn resulting_status(self) -> JobStatus {
        match self {
            JobSignal::Halt => JobStatus::Suspended,
            JobSignal::Wakeup => JobStatus::Running,
            JobSignal::Ice => JobStatus::Terminated,
        }
    }
}

impl fmt::Display for JobSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            JobSignal::Halt => "halt",
            JobSignal::Wakeup => "wakeup",
            JobSignal::Ice => "ice",
        };
        write!(f, "{}", name)
    }
}

/// Suspends the job with `pid`.
pub fn halt(table: &mut ProcessTable, pid: Pid) -> Result<()> {
    send(table, pid, JobSignal::Halt)
}

/// Resumes the job with `pid`.
pub fn wakeup(table: &mut ProcessTable, pid: Pid) -> Result<()> {
    send(table, pid, JobSignal::Wakeup)
}

/// Interrupts the job with `pid`. The job is recorded as Terminated right
/// away; the process itself is reaped by a later reconcile.
pub fn ice(table: &mut ProcessTable, pid: Pid) -> Result<()> {
    send(table, pid, JobSignal::Ice)
}

pub fn send(table: &mut ProcessTable, pid: Pid, job_signal: JobSignal) -> Result<()> {
    let previous = match table.get(pid) {
        Some(job) => job.status(),
        None => return Err(Error::no_such_job(pid.to_string())),
    };

    signal::kill(pid, job_signal.signal()).map_err(|e| {
        Error::builtin_command(format!("{}: {}: {}", job_signal, pid, e), 1)
    })?;
    debug!("sent {:?} to {}", job_signal.signal(), pid);

    // a stopped process only acts on SIGINT once it runs again
    if job_signal == JobSignal::Ice && previous == JobStatus::Suspended {
        let temp_result = signal::kill(pid, Signal::SIGCONT);
        log_if_err!(temp_result, "failed to continue {} after ice", pid);
    }

    table.set_status(pid, job_signal.resulting_status());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::core::{intermediate_representation::CommandDescriptor, job::Job};
    use crate::errors::ErrorKind;
    use crate::execute_command;

    fn spawn_sleeper(table: &mut ProcessTable) -> Pid {
        execute_command::run_single(
            table,
            CommandDescriptor::new(&["sleep", "5"]).with_blocking(false),
        )
        .unwrap()
    }

    /// Unlike `ProcessTable::get`, also finds terminated jobs.
    fn find(table: &ProcessTable, pid: Pid) -> Option<&Job> {
        table.iter().find(|job| job.pid() == pid)
    }

    fn status_of(table: &ProcessTable, pid: Pid) -> JobStatus {
        find(table, pid).map(Job::status).unwrap()
    }

    /// Polls until reconcile observes `expected`; stop/continue notifications
    /// arrive asynchronously.
    fn reconcile_until(table: &mut ProcessTable, pid: Pid, expected: JobStatus) -> bool {
        for _ in 0..100 {
            table.reconcile();
            if find(table, pid).map(Job::status) == Some(expected) {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_halt_then_wakeup() {
        let mut table = ProcessTable::new();
        let pid = spawn_sleeper(&mut table);

        halt(&mut table, pid).unwrap();
        assert_eq!(status_of(&table, pid), JobStatus::Suspended);
        assert!(reconcile_until(&mut table, pid, JobStatus::Suspended));

        wakeup(&mut table, pid).unwrap();
        assert_eq!(status_of(&table, pid), JobStatus::Running);
        assert!(reconcile_until(&mut table, pid, JobStatus::Running));

        ice(&mut table, pid).unwrap();
        assert_eq!(status_of(&table, pid), JobStatus::Terminated);
    }

    #[test]
    fn test_ice_suspended_job_is_reaped() {
        let mut table = ProcessTable::new();
        let pid = spawn_sleeper(&mut table);

        halt(&mut table, pid).unwrap();
        ice(&mut table, pid).unwrap();
        assert_eq!(status_of(&table, pid), JobStatus::Terminated);

        let mut reaped = false;
        for _ in 0..100 {
            table.reconcile();
            if find(&table, pid).map_or(false, Job::is_reaped) {
                reaped = true;
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert!(reaped, "interrupted job was never reaped");
        assert_eq!(status_of(&table, pid), JobStatus::Terminated);
    }

    #[test]
    fn test_untracked_pid_is_no_such_job() {
        let mut table = ProcessTable::new();
        let pid = Pid::from_raw(i32::max_value() - 7);
        for result in vec![
            halt(&mut table, pid),
            wakeup(&mut table, pid),
            ice(&mut table, pid),
        ] {
            match *result.unwrap_err().kind() {
                ErrorKind::NoSuchJob(ref p) => assert_eq!(p, &pid.to_string()),
                ref other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_terminated_job_is_no_such_job() {
        let mut table = ProcessTable::new();
        let pid = execute_command::run_single(&mut table, CommandDescriptor::new(&["true"]))
            .unwrap();
        assert_eq!(status_of(&table, pid), JobStatus::Terminated);
        assert!(halt(&mut table, pid).is_err());
        assert_eq!(status_of(&table, pid), JobStatus::Terminated);
    }
}
