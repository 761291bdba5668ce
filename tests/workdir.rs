#![allow(dead_code)]

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{self, Command, Stdio};

use tempfile::TempDir;

/// WorkDir represents a scratch directory in which the shell under test runs.
#[derive(Debug)]
pub struct WorkDir {
    /// Removed when the WorkDir is dropped.
    dir: TempDir,
}

impl WorkDir {
    /// Creates a fresh, empty directory for one test.
    pub fn new(name: &str) -> WorkDir {
        let dir = tempfile::Builder::new()
            .prefix(&format!("psh-{}", name))
            .tempdir()
            .expect("unable to generate temp dir");
        WorkDir { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Canonical form of the directory, as `pwd` prints it.
    pub fn canonical_path(&self) -> PathBuf {
        self.path().canonicalize().expect("canonical path")
    }

    pub fn create<P: AsRef<Path>>(&self, name: P, contents: &str) {
        fs::write(self.path().join(name), contents).expect("write file");
    }

    pub fn read<P: AsRef<Path>>(&self, name: P) -> String {
        fs::read_to_string(self.path().join(name)).expect("read file")
    }

    /// Builds a new command to run in this working directory.
    pub fn command<I, S>(&self, args: I) -> process::Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_psh"));
        cmd.current_dir(self.path());
        cmd.args(args);
        cmd
    }

    /// Runs `psh -c <line>`.
    pub fn run_line(&self, line: &str) -> process::Output {
        self.command(&["-c", line]).output().expect("spawn psh")
    }

    /// Feeds `script` to psh on stdin and waits for it to finish.
    pub fn run_script<S: AsRef<[u8]>>(&self, script: S) -> process::Output {
        let mut child = self
            .command(Vec::<&str>::new())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn psh");
        {
            let stdin = child.stdin.as_mut().expect("psh stdin");
            stdin.write_all(script.as_ref()).expect("write script");
        }
        drop(child.stdin.take());
        child.wait_with_output().expect("wait for psh")
    }

    /// Executes the command and collects its output.
    ///
    /// Panic if the command fails.
    pub fn output(&self, cmd: &mut process::Command) -> process::Output {
        let o = cmd.output().unwrap();
        if !o.status.success() {
            panic!(
                "\n\n==========\n\
                 command failed but expected success!\
                 \n\ncommand: {:?}\
                 \ncwd: {}\
                 \n\nstatus: {}\
                 \n\nstdout: {}\
                 \n\nstderr: {}\
                 \n\n==========\n",
                cmd,
                self.path().display(),
                o.status,
                String::from_utf8_lossy(&o.stdout),
                String::from_utf8_lossy(&o.stderr)
            );
        }
        o
    }
}

pub fn stdout(o: &process::Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

pub fn stderr(o: &process::Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}
