use std::fmt;
use std::io::{self, Write};

use nix::{
    errno::Errno,
    sys::wait::{self, WaitPidFlag, WaitStatus},
    unistd::Pid,
};

use crate::core::intermediate_representation::CommandDescriptor;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobStatus {
    Running,
    Suspended,
    Terminated,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Suspended => write!(f, "Suspended"),
            JobStatus::Terminated => write!(f, "Terminated"),
        }
    }
}

/// The shell's record of one launched process.
#[derive(Debug)]
pub struct Job {
    descriptor: CommandDescriptor,
    pid: Pid,
    status: JobStatus,
    /// Set once a wait has collected the process. The pid must not be waited
    /// on again afterwards; the OS may have handed it to another process.
    reaped: bool,
}

impl Job {
    /// A job created `Terminated` comes from a synchronous wait and is
    /// therefore already reaped.
    pub fn new(descriptor: CommandDescriptor, pid: Pid, status: JobStatus) -> Self {
        Self {
            descriptor,
            pid,
            status,
            reaped: status == JobStatus::Terminated,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    pub fn is_live(&self) -> bool {
        self.status != JobStatus::Terminated
    }

    pub fn is_reaped(&self) -> bool {
        self.reaped
    }

    /// Terminated is final: no transition leaves it.
    fn set_status(&mut self, status: JobStatus) {
        if self.status != JobStatus::Terminated {
            self.status = status;
        }
    }

    /// Polls the process without blocking.
    fn try_wait(&mut self) {
        if self.reaped {
            return;
        }

        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        let result = wait::waitpid(self.pid, Some(flags));
        self.apply_wait_result(result);
    }

    fn apply_wait_result(&mut self, result: nix::Result<WaitStatus>) {
        match result {
            Ok(WaitStatus::Exited(pid, status_code)) => {
                debug!("{} exited with {}.", pid, status_code);
                self.mark_reaped();
            }
            Ok(WaitStatus::Signaled(pid, signal, ..)) => {
                debug!("{} terminated by signal {:?}.", pid, signal);
                self.mark_reaped();
            }
            Ok(WaitStatus::Stopped(pid, signal)) => {
                debug!("{} was signaled to stop {:?}.", pid, signal);
                self.set_status(JobStatus::Suspended);
            }
            Ok(WaitStatus::Continued(pid)) => {
                debug!("{} was continued.", pid);
                self.set_status(JobStatus::Running);
            }
            Ok(WaitStatus::StillAlive) => (),
            Ok(other) => trace!("ignoring wait status {:?} for {}", other, self.pid),
            Err(Errno::ECHILD) => {
                debug!("{} is unknown to the OS, treating it as terminated.", self.pid);
                self.mark_reaped();
            }
            Err(e) => warn!("waitpid({}) failed: {}", self.pid, e),
        }
    }

    fn mark_reaped(&mut self) {
        self.reaped = true;
        self.status = JobStatus::Terminated;
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.pid, self.status, self.descriptor)
    }
}

/// Every job launched this session that has not been listed as terminated.
#[derive(Debug, Default)]
pub struct ProcessTable {
    /// Oldest first; the head of the table is the last element.
    jobs: Vec<Job>,
    /// Processes dropped from the table before anything waited on them.
    pending_reap: Vec<Pid>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Default::default()
    }

    /// Inserts a job at the head of the table.
    pub fn add(&mut self, descriptor: CommandDescriptor, pid: Pid, status: JobStatus) {
        debug!("tracking {} ({}) as {}", pid, descriptor, status);
        self.jobs.push(Job::new(descriptor, pid, status));
    }

    /// Checks every job for a status change without blocking.
    pub fn reconcile(&mut self) {
        for job in &mut self.jobs {
            job.try_wait();
        }

        self.pending_reap.retain(|&pid| {
            match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => true,
                Ok(status) => {
                    debug!("reaped dropped job {}: {:?}", pid, status);
                    false
                }
                Err(_) => false,
            }
        });
    }

    /// Reconciles, then writes one line per job, most recent first. Jobs
    /// shown as terminated are removed from the table.
    pub fn list(&mut self, out: &mut dyn Write) -> io::Result<()> {
        self.reconcile();

        writeln!(out, "Index\tPID\tSTATUS\tCOMMAND")?;
        for (index, job) in self.iter().enumerate() {
            writeln!(out, "{}\t{}", index, job)?;
        }

        let pending_reap = &mut self.pending_reap;
        self.jobs.retain(|job| {
            if job.is_live() {
                return true;
            }

            if !job.is_reaped() {
                pending_reap.push(job.pid());
            }
            false
        });

        Ok(())
    }

    /// Updates the most recent live job running as `pid`. Returns `false`
    /// if there is none.
    pub fn set_status(&mut self, pid: Pid, status: JobStatus) -> bool {
        match self
            .jobs
            .iter_mut()
            .rev()
            .find(|job| job.pid() == pid && job.is_live())
        {
            Some(job) => {
                job.set_status(status);
                true
            }
            None => false,
        }
    }

    /// The most recent live job running as `pid`.
    pub fn get(&self, pid: Pid) -> Option<&Job> {
        self.iter().find(|job| job.pid() == pid && job.is_live())
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.get(pid).is_some()
    }

    /// Jobs in table order, most recently added first.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Forgets every job. The processes themselves are left alone.
    pub fn clear(&mut self) {
        debug!("releasing {} jobs", self.jobs.len());
        self.jobs.clear();
        self.pending_reap.clear();
    }
}
