use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

use crate::errors::{Error, ErrorKind, Result};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    line: String,
    /// 1 for the first line of the session; never reused after eviction.
    ordinal: usize,
}

impl HistoryEntry {
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Fixed capacity ring of the most recent input lines.
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    /// The total number of history items ever saved.
    count: usize,
}

impl HistoryBuffer {
    pub fn with_capacity(capacity: usize) -> HistoryBuffer {
        HistoryBuffer {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            count: 0,
        }
    }

    /// Appends `line`, evicting the oldest entry first when the ring is full.
    pub fn append<S: Into<String>>(&mut self, line: S) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.len() == self.capacity {
            let evicted = self.entries.pop_front();
            trace!("evicted history entry {:?}", evicted);
        }
        self.count += 1;
        self.entries.push_back(HistoryEntry {
            line: line.into(),
            ordinal: self.count,
        });
    }

    /// Writes `<position>: <line>` for every retained entry, oldest first.
    pub fn list(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{}", self)
    }

    pub fn repeat_last(&self) -> Result<&str> {
        self.entries
            .back()
            .map(HistoryEntry::line)
            .ok_or_else(|| ErrorKind::EmptyHistory.into())
    }

    /// Looks up the entry at 1-based position `n` within the ring.
    pub fn repeat_by_index(&self, n: isize) -> Result<&str> {
        if n < 1 || n as usize > self.entries.len() {
            return Err(ErrorKind::HistoryEntryNotFound(n).into());
        }

        Ok(self.entries[n as usize - 1].line())
    }

    /// Performs history expansions.
    ///
    /// !! -> repeat the last command
    /// !n -> repeat command numbered n in the list of commands (starting at 1)
    ///
    /// Any other line is returned unchanged.
    pub fn expand(&self, line: &str) -> Result<String> {
        if line == "!!" {
            return self.repeat_last().map(str::to_string);
        }

        if line.len() < 2 || !line.starts_with('!') {
            return Ok(line.to_string());
        }

        match line[1..].parse::<isize>() {
            Ok(n) => self.repeat_by_index(n).map(str::to_string),
            Err(_) => Err(Error::builtin_command(
                format!("{}: event not found", line),
                1,
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The total number of lines appended this session.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        HistoryBuffer::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl fmt::Display for HistoryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "{}: {}", i + 1, entry.line)?;
        }

        Ok(())
    }
}
