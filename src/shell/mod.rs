//! The interpreter session: owns the process table, the history buffer and
//! the line editor, and runs the read-expand-parse-dispatch loop.

use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use crate::{
    core::{
        intermediate_representation::{Input, Interpreter},
        job::ProcessTable,
    },
    editor::Editor,
    errors::{Error, Result},
    execute_command,
    history::HistoryBuffer,
    util,
};

pub mod builtins;

/// Consecutive read errors after which the input is treated as gone.
const MAX_READ_FAILURES: u32 = 3;

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Determines if new command entries will be added to the shell's command
    /// history and if `!!`/`!n` are expanded.
    ///
    /// Note: This is checked before the other command history config fields.
    enable_command_history: bool,

    /// Number of entries to store in the shell's command history
    command_history_capacity: usize,

    /// Determines if a prompt is displayed when stdin is a terminal.
    display_prompt: bool,
}

impl ShellConfig {
    /// Creates a shell reading commands one line at a time.
    ///
    /// # Complete List
    /// - Command History is enabled
    /// - A prompt with the working directory is displayed if stdin is a
    ///   terminal
    pub fn interactive(command_history_capacity: usize) -> Self {
        Self {
            enable_command_history: true,
            command_history_capacity,
            display_prompt: true,
        }
    }

    /// Creates a shell running a single command string.
    ///
    /// # Complete List
    /// - Command History is disabled. Commands are not saved and history
    ///   expansions are not performed. The hist builtin command is not
    ///   affected by this option.
    /// - No prompt is displayed.
    pub fn noninteractive() -> Self {
        Default::default()
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            enable_command_history: false,
            command_history_capacity: 0,
            display_prompt: false,
        }
    }
}

pub struct Shell {
    /// Responsible for reading lines, from a terminal or plain stdin.
    editor: Editor,
    history: HistoryBuffer,
    jobs: ProcessTable,
    config: ShellConfig,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Result<Self> {
        let is_interactive = config.display_prompt && util::isatty();
        let shell = Self {
            editor: Editor::new(is_interactive)?,
            history: HistoryBuffer::with_capacity(config.command_history_capacity),
            jobs: ProcessTable::new(),
            config,
        };

        info!("psh started up");
        Ok(shell)
    }

    /// Is `false` if stdin is not a terminal or no prompt is configured.
    pub fn is_interactive(&self) -> bool {
        self.editor.is_terminal()
    }

    pub fn jobs(&self) -> &ProcessTable {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut ProcessTable {
        &mut self.jobs
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Reads the next line, showing the prompt on a terminal.
    /// Returns `None` when end of file is reached.
    fn prompt(&mut self) -> Result<Option<String>> {
        let prompt = if self.is_interactive() {
            format!("{}> ", abbreviate_home(&current_dir()).display())
        } else {
            String::new()
        };
        self.editor.readline(&prompt)
    }

    /// Runs one input line: history expansion, recording, parsing and
    /// dispatch. Output of builtins goes to `stdout`.
    pub fn execute_command_string(&mut self, input: &str, stdout: &mut dyn Write) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        let command = if self.config.enable_command_history {
            let expanded = self.history.expand(input)?;
            if expanded != input {
                writeln!(stdout, "{}", expanded)?;
            }
            self.history.append(expanded.as_str());
            self.editor.add_history_entry(input);
            expanded
        } else {
            input.to_string()
        };

        match Interpreter::parse_line(&command)? {
            None => Ok(()),
            Some(Input::Builtin { builtin, args }) => builtins::run(self, builtin, &args, stdout),
            Some(Input::Single(descriptor)) => {
                stdout.flush()?;
                execute_command::run_single(&mut self.jobs, descriptor).map(|_| ())
            }
            Some(Input::Pipeline(descriptor)) => {
                stdout.flush()?;
                execute_command::run_pipeline(&mut self.jobs, descriptor).map(|_| ())
            }
        }
    }

    /// Reads lines until end of input, then exits with status 0. A line that
    /// cannot be read is reported and skipped.
    pub fn execute_from_stdin(&mut self) -> ! {
        let mut read_failures = 0;
        loop {
            // collect background jobs that changed state since the last line
            self.jobs.reconcile();

            let input = match self.prompt() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    eprintln!("psh: {}", e);
                    read_failures += 1;
                    if read_failures >= MAX_READ_FAILURES {
                        error!("giving up on input after {} read errors: {}", read_failures, e);
                        break;
                    }
                    warn!("prompt: {}", e);
                    continue;
                }
            };
            read_failures = 0;

            if let Err(e) = self.execute_command_string(&input, &mut io::stdout()) {
                self.report(&e);
            }
        }

        self.exit(0)
    }

    /// Reports `e` on stderr; fatal errors end the session.
    pub fn report(&mut self, e: &Error) {
        eprintln!("psh: {}", e);
        if e.is_fatal() {
            error!("fatal: {}", e);
            self.exit(1);
        }
        debug!("recovered from: {:?}", e);
    }

    /// Releases every job and the history, then exits the process. Background
    /// processes are not signalled.
    pub fn exit(&mut self, code: i32) -> ! {
        self.jobs.clear();
        self.history.clear();
        self.editor.clear_history();

        let temp_result = io::stdout().flush();
        log_if_err!(temp_result, "failed to flush stdout on exit");

        info!("psh has shut down");
        process::exit(code);
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} jobs, {} history entries, {:?}",
            self.jobs.len(),
            self.history.len(),
            self.config
        )
    }
}

fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|e| {
        warn!("unable to get current directory: {}", e);
        PathBuf::new()
    })
}

/// Replaces a `$HOME` prefix with `~`.
fn abbreviate_home(path: &Path) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return path.to_path_buf(),
    };

    match path.strip_prefix(&home) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("~"),
        Ok(rel) => Path::new("~").join(rel),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::{Job, JobStatus};
    use crate::errors::ErrorKind;

    fn run(shell: &mut Shell, line: &str) -> Result<String> {
        let mut out = Vec::new();
        shell.execute_command_string(line, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn history_shell() -> Shell {
        Shell::new(ShellConfig::interactive(20)).unwrap()
    }

    #[test]
    fn test_blank_lines_are_not_recorded() {
        let mut shell = history_shell();
        assert_eq!(run(&mut shell, "   ").unwrap(), "");
        assert!(shell.history().is_empty());
    }

    #[test]
    fn test_history_expansion_echoes_and_records() {
        let mut shell = history_shell();
        run(&mut shell, "hist").unwrap();
        assert_eq!(run(&mut shell, "!!").unwrap(), "hist\n1: hist\n2: hist\n");
        assert_eq!(run(&mut shell, "!1").unwrap(), "hist\n1: hist\n2: hist\n3: hist\n");
    }

    #[test]
    fn test_failed_expansion_skips_line() {
        let mut shell = history_shell();
        match *run(&mut shell, "!!").unwrap_err().kind() {
            ErrorKind::EmptyHistory => {}
            ref other => panic!("unexpected error: {:?}", other),
        }
        assert!(run(&mut shell, "!5").is_err());
        assert!(shell.history().is_empty());
    }

    #[test]
    fn test_syntax_errors_are_recorded() {
        let mut shell = history_shell();
        assert!(run(&mut shell, "ls |").is_err());
        assert_eq!(shell.history().repeat_last().unwrap(), "ls |");
    }

    #[test]
    fn test_noninteractive_shell_keeps_no_history() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        assert!(!shell.is_interactive());
        run(&mut shell, "procs").unwrap();
        assert!(shell.history().is_empty());
        // no expansion either, so `!!` is looked up as a program
        run(&mut shell, "!!").unwrap();
    }

    #[test]
    fn test_background_command_is_tracked() {
        let mut shell = history_shell();
        run(&mut shell, "sleep 5 &").unwrap();
        let pid = shell.jobs().iter().next().map(Job::pid).unwrap();
        assert_eq!(shell.jobs().get(pid).map(Job::status), Some(JobStatus::Running));

        run(&mut shell, &format!("ice {}", pid)).unwrap();
        let listing = run(&mut shell, "procs").unwrap();
        assert!(listing.contains(&format!("0\t{}\tTerminated\tsleep 5", pid)));
        assert!(shell.jobs().is_empty());
    }

    #[test]
    fn test_abbreviate_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(abbreviate_home(&home), PathBuf::from("~"));
            assert_eq!(abbreviate_home(&home.join("src")), PathBuf::from("~/src"));
        }
        assert_eq!(
            abbreviate_home(Path::new("/definitely/not/home")),
            PathBuf::from("/definitely/not/home")
        );
    }
}
