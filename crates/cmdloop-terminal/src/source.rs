//! Line sources feeding the dispatch loop.

use std::collections::VecDeque;
use std::io::BufRead;

use cmdloop_types::error::Result;

/// Something that yields one input line at a time.
pub trait LineSource {
    /// Block until the next full line is available.
    ///
    /// Returns `Ok(None)` once the source is exhausted. The line terminator
    /// is not included.
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// Reads newline-delimited lines from any buffered reader (e.g. stdin).
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

/// In-memory queue for programmatic injection and tests.
#[derive(Debug, Default, Clone)]
pub struct QueueSource {
    lines: VecDeque<String>,
}

impl QueueSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the end of the queue.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for QueueSource {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for QueueSource {
    fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_strips_terminators() {
        let mut src = ReaderSource::new(Cursor::new("addf 1 2\r\nexitf\n"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("addf 1 2"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("exitf"));
        assert_eq!(src.next_line().unwrap(), None);
    }

    #[test]
    fn reader_last_line_without_newline() {
        let mut src = ReaderSource::new(Cursor::new("helpf"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("helpf"));
        assert_eq!(src.next_line().unwrap(), None);
    }

    #[test]
    fn reader_keeps_blank_lines() {
        let mut src = ReaderSource::new(Cursor::new("\nx\n"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn queue_is_fifo() {
        let mut src: QueueSource = ["a", "b"].into_iter().collect();
        src.push("c");
        assert_eq!(src.len(), 3);
        assert_eq!(src.next_line().unwrap().as_deref(), Some("a"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("b"));
        assert_eq!(src.next_line().unwrap().as_deref(), Some("c"));
        assert!(src.is_empty());
        assert_eq!(src.next_line().unwrap(), None);
    }
}
