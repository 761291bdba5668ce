//! Launching external programs.
//!
//! Everything that crosses a fork goes through [`spawn`]: the caller describes
//! which descriptors the child should install with a [`Wiring`], and `spawn`
//! guarantees that the parent's copies of those descriptors are closed by the
//! time it returns, whether or not the fork succeeded.

use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::io::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::path::Path;

use nix::{
    errno::Errno,
    fcntl::{self, OFlag},
    libc,
    sys::{
        stat::Mode,
        wait::{self, WaitStatus},
    },
    unistd::{self, ForkResult, Pid},
};

use crate::{
    core::{
        intermediate_representation::CommandDescriptor,
        job::{JobStatus, ProcessTable},
    },
    errors::{Error, ErrorKind, Result, ResultExt},
};

/// Descriptors a spawned child installs before its program image is replaced.
#[derive(Debug, Default)]
pub struct Wiring {
    stdin: Option<OwnedFd>,
    stdout: Option<OwnedFd>,
    /// Descriptors the child inherits but must not keep, e.g. the other end
    /// of its pipe. They are still owned by the parent.
    close_in_child: Vec<RawFd>,
}

impl Wiring {
    pub fn inherit() -> Self {
        Default::default()
    }

    pub fn stdin_from(fd: OwnedFd) -> Self {
        Self {
            stdin: Some(fd),
            ..Default::default()
        }
    }

    pub fn stdout_to(fd: OwnedFd) -> Self {
        Self {
            stdout: Some(fd),
            ..Default::default()
        }
    }

    pub fn closing<F: AsRawFd>(mut self, fd: &F) -> Self {
        self.close_in_child.push(fd.as_raw_fd());
        self
    }
}

/// Forks and execs `descriptor`, returning the child's pid.
///
/// Postconditions, in the parent: every descriptor owned by `wiring` is
/// closed. In the child: stdin/stdout are replaced as `wiring` says, the
/// original pipe descriptors and `close_in_child` are closed, then the
/// descriptor's own redirects are applied. A failing redirect or exec is
/// reported on stderr and the child calls `_exit(1)`, so nothing buffered in
/// the parent is flushed twice.
pub fn spawn(descriptor: &CommandDescriptor, wiring: Wiring) -> Result<Pid> {
    let argv = descriptor
        .argv()
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<::std::result::Result<Vec<CString>, _>>()
        .map_err(|_| Error::syntax(descriptor.to_string()))?;
    let diagnostics = ChildDiagnostics::new(descriptor);

    let temp_result = io::stdout().flush();
    log_if_err!(temp_result, "failed to flush stdout before fork");

    // The child only touches memory prepared above before it execs or exits.
    let fork_result = unsafe { unistd::fork() }
        .chain_err(|| ErrorKind::Fork(descriptor.program().to_string()))?;
    match fork_result {
        ForkResult::Parent { child } => {
            drop(wiring);
            debug!("launched {}: {}", child, descriptor);
            Ok(child)
        }
        ForkResult::Child => exec_child(descriptor, &argv, wiring, &diagnostics),
    }
}

/// Messages a child may print. They are formatted before the fork, so the
/// child writes raw bytes and never allocates or takes the stderr lock.
struct ChildDiagnostics {
    wiring: Vec<u8>,
    input: Vec<u8>,
    output: Vec<u8>,
    not_found: Vec<u8>,
    exec: Vec<u8>,
}

impl ChildDiagnostics {
    fn new(descriptor: &CommandDescriptor) -> Self {
        let program = descriptor.program();
        let redirect = |what: &str, path: Option<&Path>| match path {
            Some(path) => format!("psh: could not redirect {} {}: ", what, path.display()),
            None => String::new(),
        };
        Self {
            wiring: format!("psh: {}: could not set up pipe: ", program).into_bytes(),
            input: redirect("input from", descriptor.input_redirect()).into_bytes(),
            output: redirect("output to", descriptor.output_redirect()).into_bytes(),
            not_found: format!("psh: {}: command not found", program).into_bytes(),
            exec: format!("psh: {}: ", program).into_bytes(),
        }
    }
}

fn exec_child(
    descriptor: &CommandDescriptor,
    argv: &[CString],
    wiring: Wiring,
    diagnostics: &ChildDiagnostics,
) -> ! {
    if let Err(e) = install_wiring(wiring) {
        child_fail(&diagnostics.wiring, Some(e));
    }

    if let Some(path) = descriptor.input_redirect() {
        let installed = fcntl::open(path, OFlag::O_RDONLY, Mode::empty())
            .and_then(|fd| replace_fd(fd, libc::STDIN_FILENO));
        if let Err(e) = installed {
            child_fail(&diagnostics.input, Some(e));
        }
    }

    if let Some(path) = descriptor.output_redirect() {
        let installed = fcntl::open(
            path,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH,
        )
        .and_then(|fd| replace_fd(fd, libc::STDOUT_FILENO));
        if let Err(e) = installed {
            child_fail(&diagnostics.output, Some(e));
        }
    }

    match unistd::execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(Errno::ENOENT) => child_fail(&diagnostics.not_found, None),
        Err(e) => child_fail(&diagnostics.exec, Some(e)),
    }
}

/// Writes `message`, then the errno description, and exits without running
/// any exit handlers.
fn child_fail(message: &[u8], errno: Option<Errno>) -> ! {
    let stderr = io::stderr();
    let _ = unistd::write(&stderr, message);
    if let Some(e) = errno {
        let _ = unistd::write(&stderr, e.desc().as_bytes());
    }
    let _ = unistd::write(&stderr, b"\n");
    unsafe { libc::_exit(1) }
}

fn install_wiring(wiring: Wiring) -> nix::Result<()> {
    let Wiring {
        stdin,
        stdout,
        close_in_child,
    } = wiring;

    if let Some(fd) = stdin {
        replace_fd(fd.into_raw_fd(), libc::STDIN_FILENO)?;
    }
    if let Some(fd) = stdout {
        replace_fd(fd.into_raw_fd(), libc::STDOUT_FILENO)?;
    }
    for fd in close_in_child {
        unistd::close(fd)?;
    }

    Ok(())
}

/// Moves `fd` onto `target` and closes the original. `dup2` clears
/// `FD_CLOEXEC` on `target`.
fn replace_fd(fd: RawFd, target: RawFd) -> nix::Result<()> {
    if fd != target {
        unistd::dup2(fd, target)?;
        unistd::close(fd)?;
    }
    Ok(())
}

/// Blocks until `pid` exits.
pub fn wait_for_foreground(pid: Pid) -> Result<()> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(WaitStatus::Exited(pid, status_code)) => {
                debug!("{} exited with {}.", pid, status_code);
                return Ok(());
            }
            Ok(WaitStatus::Signaled(pid, signal, ..)) => {
                debug!("{} terminated by signal {:?}.", pid, signal);
                return Ok(());
            }
            Ok(status) => trace!("still waiting for {}: {:?}", pid, status),
            Err(Errno::EINTR) => (),
            Err(Errno::ECHILD) => {
                warn!("{} was reaped before the foreground wait", pid);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Waits for blocking stages, then records the stage in the table.
fn register(table: &mut ProcessTable, descriptor: CommandDescriptor, pid: Pid) -> Result<()> {
    if descriptor.is_blocking() {
        wait_for_foreground(pid)?;
        table.add(descriptor, pid, JobStatus::Terminated);
    } else {
        table.add(descriptor, pid, JobStatus::Running);
    }
    Ok(())
}

/// Runs one external command.
pub fn run_single(table: &mut ProcessTable, descriptor: CommandDescriptor) -> Result<Pid> {
    let pid = spawn(&descriptor, Wiring::inherit())?;
    register(table, descriptor, pid)?;
    Ok(pid)
}

/// The pipe owns the first stage's stdout and the second stage's stdin, so
/// neither may also be redirected.
pub fn validate_pipeline(first: &CommandDescriptor, second: &CommandDescriptor) -> Result<()> {
    if first.output_redirect().is_some() || second.input_redirect().is_some() {
        return Err(ErrorKind::InvalidPipeline(
            "cannot redirect left-side output or right-side input in a pipe".to_string(),
        )
        .into());
    }
    Ok(())
}

/// Returns `(read_end, write_end)`. Both are close-on-exec, so children
/// forked for other commands never hold a pipe end open.
fn create_pipe() -> Result<(OwnedFd, OwnedFd)> {
    unistd::pipe2(OFlag::O_CLOEXEC).chain_err(|| ErrorKind::Pipe)
}

/// Runs `first | first.next`, returning both pids. Each stage is waited on
/// according to its own blocking flag, first stage first.
pub fn run_pipeline(table: &mut ProcessTable, mut first: CommandDescriptor) -> Result<(Pid, Pid)> {
    let second = first.take_next().ok_or_else(|| {
        Error::from(ErrorKind::InvalidPipeline(format!(
            "{}: a pipeline needs two commands",
            first
        )))
    })?;
    validate_pipeline(&first, &second)?;

    let (read_end, write_end) = create_pipe()?;

    // The write end is closed in the parent as soon as the first stage holds
    // it; otherwise the second stage would never see end of input.
    let first_pid = spawn(&first, Wiring::stdout_to(write_end).closing(&read_end))?;
    let second_pid = spawn(&second, Wiring::stdin_from(read_end))?;

    register(table, first, first_pid)?;
    register(table, second, second_pid)?;
    Ok((first_pid, second_pid))
}
