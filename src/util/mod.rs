use std::io;
use std::os::unix::prelude::*;

pub use self::unix::isatty;

/// Logs the error held by `$result`, if any, and carries on.
macro_rules! log_if_err {
    ($result:expr, $msg:expr) => {{
        if let Err(ref e) = $result {
            error!("{}: {}", $msg, e);
        }
    }};
    ($result:expr, $fmt:expr, $($arg:tt)+) => {{
        if let Err(ref e) = $result {
            error!("{}: {}", format_args!($fmt, $($arg)+), e);
        }
    }};
}

pub mod unix;

pub fn get_terminal() -> RawFd {
    io::stdin().as_raw_fd()
}

/// Joins argv the way it is displayed in `procs` and the debug trace.
pub fn join_argv<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(" ")
}
