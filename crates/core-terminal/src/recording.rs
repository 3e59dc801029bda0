//! In-memory backend that records emitted directives and replays scripted
//! input records.
//!
//! This is what lets the diffing and decoding algorithms run under `cargo
//! test` without a terminal: tests script the input with `push_record`,
//! drive the renderer or translator, then assert on the directive log.
//! `read_record` pops the script; an exhausted script reads as "no record",
//! so blocking callers must script enough records to produce an event.

use crate::{InputRecord, TerminalBackend, WindowSize};
use anyhow::Result;
use std::collections::VecDeque;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Write(Vec<u8>),
    SetCursorVisible(bool),
    FillBlank { x: u16, y: u16, count: u32 },
    FillAttr { x: u16, y: u16, count: u32 },
    Scroll { top: u16, bottom: u16, delta: i32 },
    Beep,
}

#[derive(Debug)]
pub struct RecordingBackend {
    pub size: WindowSize,
    pub cursor: (u16, u16),
    pub cursor_shown: bool,
    pub directives: Vec<Directive>,
    pub records: VecDeque<InputRecord>,
}

impl RecordingBackend {
    pub fn new(height: u16, width: u16) -> Self {
        Self {
            size: WindowSize { height, width },
            cursor: (0, 0),
            cursor_shown: true,
            directives: Vec::new(),
            records: VecDeque::new(),
        }
    }

    /// Script one raw record for a later `read_record`.
    pub fn push_record(&mut self, record: InputRecord) {
        self.records.push_back(record);
    }

    /// Number of raw write calls recorded so far.
    pub fn write_count(&self) -> usize {
        self.directives
            .iter()
            .filter(|d| matches!(d, Directive::Write(_)))
            .count()
    }

    /// All written bytes, concatenated and lossily decoded.
    pub fn written_text(&self) -> String {
        self.directives
            .iter()
            .filter_map(|d| match d {
                Directive::Write(bytes) => Some(String::from_utf8_lossy(bytes)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_directives(&mut self) {
        self.directives.clear();
    }
}

impl TerminalBackend for RecordingBackend {
    fn size(&mut self) -> Result<WindowSize> {
        Ok(self.size)
    }

    fn scrollback_extent(&mut self) -> Result<u16> {
        Ok(self.size.height.saturating_sub(1))
    }

    fn cursor_visible(&mut self) -> Result<bool> {
        Ok(self.cursor_shown)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        self.cursor_shown = visible;
        self.directives.push(Directive::SetCursorVisible(visible));
        Ok(())
    }

    fn cursor_position(&mut self) -> Result<(u16, u16)> {
        Ok(self.cursor)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.directives.push(Directive::Write(bytes.to_vec()));
        Ok(())
    }

    fn fill_blank(&mut self, x: u16, y: u16, count: u32) -> Result<()> {
        self.directives.push(Directive::FillBlank { x, y, count });
        Ok(())
    }

    fn fill_default_attr(&mut self, x: u16, y: u16, count: u32) -> Result<()> {
        self.directives.push(Directive::FillAttr { x, y, count });
        Ok(())
    }

    fn scroll_region(&mut self, top: u16, bottom: u16, delta: i32) -> Result<()> {
        self.directives.push(Directive::Scroll { top, bottom, delta });
        Ok(())
    }

    fn read_record(&mut self) -> Result<Option<InputRecord>> {
        Ok(self.records.pop_front())
    }

    fn beep(&mut self) -> Result<()> {
        self.directives.push(Directive::Beep);
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_replay_in_order() {
        let mut backend = RecordingBackend::new(24, 80);
        backend.push_record(InputRecord::Other);
        backend.push_record(InputRecord::Resize {
            width: 100,
            height: 30,
        });
        assert_eq!(backend.read_record().unwrap(), Some(InputRecord::Other));
        assert!(matches!(
            backend.read_record().unwrap(),
            Some(InputRecord::Resize { .. })
        ));
        assert_eq!(backend.read_record().unwrap(), None);
    }

    #[test]
    fn write_log_accumulates() {
        let mut backend = RecordingBackend::new(24, 80);
        backend.write(b"abc").unwrap();
        backend.write(b"\x1b[2D").unwrap();
        assert_eq!(backend.write_count(), 2);
        assert_eq!(backend.written_text(), "abc\x1b[2D");
    }
}
