//! Terminal backend abstraction.
//!
//! The rendering and input-decoding core never calls OS console primitives
//! directly; everything goes through the narrow [`TerminalBackend`]
//! capability so the algorithms can run unchanged against the production
//! crossterm implementation or the in-memory [`RecordingBackend`] used by
//! tests.
//!
//! A backend is a byte sink plus a handful of console primitives: geometry
//! and scrollback queries, cursor visibility and position, linear blank
//! fills, a signed region scroll, and a blocking read of one classified raw
//! input record. Any failing call leaves the terminal in an indeterminate
//! state; faults are propagated, never retried.

use anyhow::Result;
use bitflags::bitflags;

pub mod backend;
pub mod capabilities;
pub mod recording;

pub use backend::CrosstermBackend;
pub use capabilities::TerminalCapabilities;
pub use recording::{Directive, RecordingBackend};

/// Window geometry in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub height: u16,
    pub width: u16,
}

bitflags! {
    /// Modifier state attached to a raw key record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlKeys: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

/// One raw key record as reported by the console.
///
/// `ch` is the decoded character payload (`'\0'` when the key produced
/// none, e.g. arrows and function keys); `virtual_key` is the platform key
/// code consumed by the translator's symbolic-name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    pub key_down: bool,
    pub ch: char,
    pub virtual_key: u16,
    pub mods: ControlKeys,
}

/// One raw input record, classified at the backend boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRecord {
    Key(KeyRecord),
    Resize { width: u16, height: u16 },
    /// Mouse, focus, and menu records; the translator discards these.
    Other,
}

/// Capability surface the rendering/decoding core consumes.
pub trait TerminalBackend {
    /// Current window geometry.
    fn size(&mut self) -> Result<WindowSize>;

    /// Bottom row of the scrollable extent, in buffer rows.
    fn scrollback_extent(&mut self) -> Result<u16>;

    fn cursor_visible(&mut self) -> Result<bool>;
    fn set_cursor_visible(&mut self, visible: bool) -> Result<()>;

    /// Physical cursor position (column, row).
    fn cursor_position(&mut self) -> Result<(u16, u16)>;

    /// Write raw bytes (text and cursor directives) to the output stream.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Fill `count` cells with blanks starting at `(x, y)`, wrapping at the
    /// window edge, without moving the cursor.
    fn fill_blank(&mut self, x: u16, y: u16, count: u32) -> Result<()>;

    /// Reset the attributes of `count` cells starting at `(x, y)`.
    fn fill_default_attr(&mut self, x: u16, y: u16, count: u32) -> Result<()>;

    /// Scroll rows `[top, bottom]` by `delta` rows; negative deltas move
    /// content up.
    fn scroll_region(&mut self, top: u16, bottom: u16, delta: i32) -> Result<()>;

    /// Block until one raw input record is available. `Ok(None)` means the
    /// read completed without yielding a record.
    fn read_record(&mut self) -> Result<Option<InputRecord>>;

    /// Sound the terminal bell.
    fn beep(&mut self) -> Result<()>;

    /// Enter raw input mode. Idempotent.
    fn enter(&mut self) -> Result<()>;

    /// Leave raw input mode. Idempotent.
    fn leave(&mut self) -> Result<()>;
}
