#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

use std::io;
use std::process;

use docopt::Docopt;
use log::LevelFilter;
use nix::unistd::Pid;
use psh_rs::errors::*;
use psh_rs::{Shell, ShellConfig};

const COMMAND_HISTORY_CAPACITY: usize = 20;

const USAGE: &str = "
psh.

Usage:
    psh [options]
    psh [options] -c <command>
    psh (-h | --help)
    psh --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -d              Debug: trace every launched process to stderr.
    -c              If the -c option is present, then the command is read from the first
                        non-option argument command_string.
    --log=<path>    Also write a full trace log to <path>.
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_d: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if let Err(e) = init_logger(args.flag_d, args.flag_log.as_ref().map(String::as_str)) {
        eprintln!("psh: failed to initialize logging: {}", e);
    }
    debug!("{:?}", args);

    if args.flag_version {
        println!("psh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c {
        execute_from_command_string(args.arg_command.as_ref().map_or("", String::as_str));
    } else {
        execute_from_stdin();
    }
}

fn init_logger(debug: bool, log_path: Option<&str>) -> Result<()> {
    let pid = Pid::this();
    let stderr_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Trace)
        .chain(fern::Dispatch::new().level(stderr_level).chain(io::stderr()));

    if let Some(log_path) = log_path {
        dispatch = dispatch.chain(fern::log_file(log_path)?);
    }

    dispatch
        .apply()
        .map_err(|e| Error::from(format!("logger already set: {}", e)))
}

fn execute_from_command_string(command: &str) -> ! {
    let shell_config = ShellConfig::noninteractive();
    let mut shell = Shell::new(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));

    match shell.execute_command_string(command, &mut io::stdout()) {
        Ok(()) => shell.exit(0),
        Err(e) => {
            shell.report(&e);
            shell.exit(e.code())
        }
    }
}

fn execute_from_stdin() -> ! {
    let shell_config = ShellConfig::interactive(COMMAND_HISTORY_CAPACITY);
    let mut shell = Shell::new(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));
    shell.execute_from_stdin()
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("psh: {}", error);
    process::exit(1);
}
