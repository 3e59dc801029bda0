//! Crossterm-backed production implementation of [`TerminalBackend`].
//!
//! Raw-mode lifecycle follows the usual RAII shape: `enter`/`leave` are
//! idempotent and `Drop` restores the terminal even if the caller
//! early-returns or panics.

use crate::{ControlKeys, InputRecord, KeyRecord, TerminalBackend, WindowSize};
use anyhow::Result;
use crossterm::{
    cursor::{self, Hide, MoveTo, Show},
    event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, ScrollDown, ScrollUp, disable_raw_mode, enable_raw_mode},
};
use std::io::{Write, stdout};
use tracing::debug;

pub struct CrosstermBackend {
    entered: bool,
    // Crossterm exposes no visibility query; track what we last set.
    cursor_shown: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            entered: false,
            cursor_shown: true,
        }
    }
}

impl TerminalBackend for CrosstermBackend {
    fn size(&mut self) -> Result<WindowSize> {
        let (width, height) = terminal::size()?;
        Ok(WindowSize { height, width })
    }

    fn scrollback_extent(&mut self) -> Result<u16> {
        // ANSI terminals expose no scrollback query; the window bottom is
        // the scrollable extent.
        Ok(self.size()?.height.saturating_sub(1))
    }

    fn cursor_visible(&mut self) -> Result<bool> {
        Ok(self.cursor_shown)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            execute!(stdout(), Show)?;
        } else {
            execute!(stdout(), Hide)?;
        }
        self.cursor_shown = visible;
        Ok(())
    }

    fn cursor_position(&mut self) -> Result<(u16, u16)> {
        Ok(cursor::position()?)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut out = stdout();
        out.write_all(bytes)?;
        out.flush()?;
        Ok(())
    }

    fn fill_blank(&mut self, x: u16, y: u16, count: u32) -> Result<()> {
        let width = self.size()?.width.max(1);
        let restore = self.cursor_position()?;
        let mut out = stdout();
        let mut remaining = count;
        let (mut cx, mut cy) = (x.min(width - 1), y);
        while remaining > 0 {
            let run = remaining.min(u32::from(width - cx));
            queue!(out, MoveTo(cx, cy), Print(" ".repeat(run as usize)))?;
            remaining -= run;
            cx = 0;
            cy = cy.saturating_add(1);
        }
        queue!(out, MoveTo(restore.0, restore.1))?;
        out.flush()?;
        Ok(())
    }

    fn fill_default_attr(&mut self, _x: u16, _y: u16, _count: u32) -> Result<()> {
        // The blank fill above writes unstyled cells; ANSI has no separate
        // attribute fill to issue.
        Ok(())
    }

    fn scroll_region(&mut self, _top: u16, _bottom: u16, delta: i32) -> Result<()> {
        // ANSI scroll directives act on the whole screen; the region bounds
        // only matter for console APIs with addressable buffers.
        if delta < 0 {
            execute!(stdout(), ScrollUp(delta.unsigned_abs().min(u32::from(u16::MAX)) as u16))?;
        } else if delta > 0 {
            execute!(stdout(), ScrollDown(delta.min(i32::from(u16::MAX)) as u16))?;
        }
        Ok(())
    }

    fn read_record(&mut self) -> Result<Option<InputRecord>> {
        let record = match event::read()? {
            CtEvent::Resize(width, height) => InputRecord::Resize { width, height },
            CtEvent::Key(key) => InputRecord::Key(translate_key(key)),
            _ => InputRecord::Other,
        };
        Ok(Some(record))
    }

    fn beep(&mut self) -> Result<()> {
        self.write(b"\x07")
    }

    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            self.entered = true;
            debug!(target: "terminal", "entered raw mode");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), Show)?;
            disable_raw_mode()?;
            self.entered = false;
            debug!(target: "terminal", "left raw mode");
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// Reduce a crossterm key event to the raw record shape the translator
/// consumes: a character payload plus a virtual-key code.
fn translate_key(key: KeyEvent) -> KeyRecord {
    let key_down = key.kind != KeyEventKind::Release;
    let mods = map_mods(key.modifiers);
    let (ch, virtual_key) = match key.code {
        KeyCode::Char(c) => {
            // Control chords reach console readers as control characters.
            let ch = if mods.contains(ControlKeys::CTRL) && c.is_ascii_alphabetic() {
                ((c.to_ascii_uppercase() as u8) & 0x1f) as char
            } else {
                c
            };
            (ch, c.to_ascii_uppercase() as u16)
        }
        KeyCode::Enter => ('\r', 0x0D),
        KeyCode::Tab => ('\t', 0x09),
        KeyCode::Backspace => ('\x08', 0x08),
        KeyCode::Esc => ('\x1b', 0x1B),
        KeyCode::PageUp => ('\0', 0x21),
        KeyCode::PageDown => ('\0', 0x22),
        KeyCode::End => ('\0', 0x23),
        KeyCode::Home => ('\0', 0x24),
        KeyCode::Left => ('\0', 0x25),
        KeyCode::Up => ('\0', 0x26),
        KeyCode::Right => ('\0', 0x27),
        KeyCode::Down => ('\0', 0x28),
        KeyCode::Insert => ('\0', 0x2D),
        KeyCode::Delete => ('\0', 0x2E),
        KeyCode::F(n) => ('\0', 0x6F + u16::from(n)),
        _ => ('\0', 0),
    };
    KeyRecord {
        key_down,
        ch,
        virtual_key,
        mods,
    }
}

fn map_mods(m: KeyModifiers) -> ControlKeys {
    let mut out = ControlKeys::empty();
    if m.contains(KeyModifiers::CONTROL) {
        out |= ControlKeys::CTRL;
    }
    if m.contains(KeyModifiers::ALT) {
        out |= ControlKeys::ALT;
    }
    if m.contains(KeyModifiers::SHIFT) {
        out |= ControlKeys::SHIFT;
    }
    out
}
