//! Psh - a process shell
//!
//! Launches external programs with I/O redirection, a two stage pipeline,
//! background jobs that can be halted, woken up and interrupted, and a
//! bounded command history.

#![deny(trivial_casts, trivial_numeric_casts, unused_import_braces)]
#![warn(missing_debug_implementations)]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lalrpop_util;
#[macro_use]
extern crate log;

#[macro_use]
mod util;

pub mod core;
mod editor;
pub mod errors;
pub mod execute_command;
pub mod history;
pub mod job_control;
pub mod shell;

pub use crate::core::job::{Job, JobStatus, ProcessTable};
pub use crate::history::HistoryBuffer;
pub use crate::shell::{Shell, ShellConfig};
