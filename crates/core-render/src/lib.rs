//! Display renderer: minimal-write screen diffing over a terminal backend.
//!
//! The renderer owns the retained copy of the previously painted screen, the
//! scroll offset mapping the virtual screen onto the visible window, and the
//! tracked cursor position. Each [`RenderState::refresh`] computes the
//! smallest set of backend writes that transforms the displayed content into
//! the requested screen, then restores the cursor.
//!
//! Invariants:
//! - The visible window covers virtual rows `[offset, offset + height)`;
//!   after any successful refresh whose target row indexes the new screen,
//!   `offset <= target row < offset + height`.
//! - The retained screen covers the window once the growth loop has run
//!   (`retained.len() >= min(new.len(), height)`).
//! - `pos` tracks the physical cursor in virtual coordinates; every emitted
//!   move keeps it in sync, except immediately after writing text containing
//!   escape sequences, where the cursor is pessimistically re-homed to
//!   column 0 of the row.
//!
//! The renderer never reads input. Its only coupling to the translator is
//! the synthetic [`Event::Scroll`] pushed at the queue front when a cursor
//! target falls outside the window; the editor loop must answer it with a
//! fresh `refresh` before retrying the move.

pub mod width;

use crate::width::display_width;
use anyhow::Result;
use core_events::{Event, EventQueue};
use core_terminal::{TerminalBackend, TerminalCapabilities};
use thiserror::Error;
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid cursor position ({x}, {y})")]
    InvalidPosition { x: isize, y: isize },
}

/// Retained rendering state for one console session.
///
/// Created by [`RenderState::prepare`], mutated by every refresh, dropped at
/// session end. All cursor/offset bookkeeping lives in these fields; there
/// is no hidden state.
#[derive(Debug)]
pub struct RenderState {
    /// Previously painted virtual screen, top to bottom.
    screen: Vec<String>,
    /// Tracked physical cursor in virtual coordinates (column, row).
    pos: (usize, usize),
    /// Virtual row shown at the top of the window.
    offset: usize,
    height: usize,
    width: usize,
    capabilities: TerminalCapabilities,
}

impl RenderState {
    /// Allocate fresh state from the backend's current geometry.
    pub fn prepare<B: TerminalBackend>(backend: &mut B) -> Result<Self> {
        let size = backend.size()?;
        trace!(target: "render", height = size.height, width = size.width, "prepare");
        Ok(Self {
            screen: Vec::new(),
            pos: (0, 0),
            offset: 0,
            height: size.height as usize,
            width: size.width as usize,
            capabilities: TerminalCapabilities::detect(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn retained_rows(&self) -> usize {
        self.screen.len()
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.pos
    }

    /// Repaint the window so it shows `screen` with the cursor at `cursor`.
    ///
    /// `cursor` is (column, row) in virtual coordinates; the row must index
    /// into `screen`. Unchanged rows cost no backend calls. The screen is
    /// committed as the new retained state on success.
    pub fn refresh<B: TerminalBackend>(
        &mut self,
        backend: &mut B,
        queue: &mut EventQueue,
        mut screen: Vec<String>,
        cursor: (usize, usize),
    ) -> Result<()> {
        let (cx, cy) = cursor;
        trace!(
            target: "render.refresh",
            cx,
            cy,
            offset = self.offset,
            rows = screen.len(),
            "refresh"
        );

        // Grow the retained screen until it covers the visible window,
        // opening one fresh terminal row at a time.
        while self.screen.len() < screen.len().min(self.height) {
            backend.set_cursor_visible(false)?;
            self.move_relative(backend, 0, self.screen.len() as isize - 1)?;
            backend.write(b"\n")?;
            self.pos = (0, self.screen.len());
            self.screen.push(String::new());
        }

        let old_offset = self.offset;
        let mut offset = self.offset;
        let height = self.height;

        // Keep the cursor row inside the window, using as much of the
        // window as the screen allows.
        if cy < offset {
            offset = cy;
        } else if cy >= offset + height {
            offset = cy - height + 1;
            let delta = offset - old_offset;
            self.scroll_window(backend, delta, offset)?;
        } else if offset > 0 && screen.len() < offset + height {
            offset = screen.len().saturating_sub(height);
            // Pad so the diff below sees a slice of matching length.
            screen.push(String::new());
        }

        let old_rows: Vec<String> = self
            .screen
            .iter()
            .skip(old_offset)
            .take(height)
            .cloned()
            .collect();
        let new_end = (offset + height).min(screen.len());
        let new_rows = &screen[offset.min(new_end)..new_end];

        self.offset = offset;

        backend.set_cursor_visible(false)?;
        let visible = old_rows.len().min(new_rows.len());
        for i in 0..visible {
            let y = offset + i;
            if old_rows[i] != new_rows[i] {
                self.write_changed_line(backend, y, &old_rows[i], &new_rows[i])?;
            }
        }

        // Erase rows the new screen no longer covers, top to bottom.
        let mut y = new_rows.len();
        while y < old_rows.len() {
            self.move_relative(backend, 0, y as isize)?;
            self.pos = (0, y);
            self.erase_to_end(backend)?;
            y += 1;
        }

        backend.set_cursor_visible(true)?;

        self.screen = screen;
        self.move_cursor(backend, queue, cx as isize, cy as isize)
    }

    /// Shift the window down by `delta` rows so `offset` becomes the new top
    /// row, keeping tracked cursor and retained tail aligned.
    fn scroll_window<B: TerminalBackend>(
        &mut self,
        backend: &mut B,
        delta: usize,
        offset: usize,
    ) -> Result<()> {
        if self.capabilities.supports_scroll_region {
            let extent = backend.scrollback_extent()?;
            backend.scroll_region(0, extent, -(delta as i32))?;
            self.pos.1 += delta;
            self.offset += delta;
            for _ in 0..delta {
                self.screen.push(String::new());
            }
            trace!(target: "render.scroll", delta, offset, "scrolled");
        } else {
            // No scroll primitive: wipe the display and forget the retained
            // contents so the diff repaints every visible row.
            backend.write(b"\x1b[H\x1b[J")?;
            for line in self.screen.iter_mut() {
                line.clear();
            }
            while self.screen.len() < offset + self.height {
                self.screen.push(String::new());
            }
            self.pos = (0, offset);
            self.offset += delta;
            trace!(target: "render.scroll", delta, offset, "repainted in place of scroll");
        }
        Ok(())
    }

    /// Repaint one row, reusing the old line up to the first difference.
    ///
    /// The prefix walk stops at an escape character: it may start a sequence
    /// that moves the cursor, so nothing after it can be trusted to line up
    /// column-for-column.
    fn write_changed_line<B: TerminalBackend>(
        &mut self,
        backend: &mut B,
        y: usize,
        oldline: &str,
        newline: &str,
    ) -> Result<()> {
        let old_width = display_width(oldline);
        let new_width = display_width(newline);
        let min_width = old_width.min(new_width);

        let mut x_cols = 0usize;
        let mut split = 0usize;
        for (g_old, g_new) in oldline.graphemes(true).zip(newline.graphemes(true)) {
            if x_cols >= min_width || g_old != g_new || g_new.starts_with('\x1b') {
                break;
            }
            x_cols += display_width(g_new);
            split += g_new.len();
        }

        backend.set_cursor_visible(false)?;
        self.move_relative(backend, x_cols as isize, y as isize)?;
        if old_width > new_width {
            self.erase_to_end(backend)?;
        }
        backend.write(newline[split..].as_bytes())?;
        self.pos = (new_width, y);

        if newline.contains('\x1b') {
            // Escape sequences may have left the real cursor anywhere;
            // re-home to a known column.
            self.move_relative(backend, 0, y as isize)?;
            self.pos = (0, y);
        }
        Ok(())
    }

    /// Move the cursor to `(x, y)` in virtual coordinates.
    ///
    /// Negative coordinates are a caller error. A row outside the window
    /// cannot be reached directly: a [`Event::Scroll`] is pushed at the
    /// queue front instead and no directive is emitted, signalling the
    /// editor loop to refresh first.
    pub fn move_cursor<B: TerminalBackend>(
        &mut self,
        backend: &mut B,
        queue: &mut EventQueue,
        x: isize,
        y: isize,
    ) -> Result<()> {
        trace!(target: "render.cursor", x, y, "move_cursor");
        if x < 0 || y < 0 {
            return Err(RenderError::InvalidPosition { x, y }.into());
        }
        let (x, y) = (x as usize, y as usize);
        if y < self.offset || y >= self.offset + self.height {
            queue.push_front(Event::Scroll);
            return Ok(());
        }
        self.move_relative(backend, x as isize, y as isize)?;
        self.pos = (x, y);
        Ok(())
    }

    /// Emit the minimal relative move from the tracked position to `(x, y)`:
    /// at most one horizontal and one vertical directive, nothing for zero
    /// deltas. Does not update the tracked position.
    fn move_relative<B: TerminalBackend>(&self, backend: &mut B, x: isize, y: isize) -> Result<()> {
        let dx = x - self.pos.0 as isize;
        let dy = y - self.pos.1 as isize;
        if dx < 0 {
            backend.write(format!("\x1b[{}D", -dx).as_bytes())?;
        } else if dx > 0 {
            backend.write(format!("\x1b[{dx}C").as_bytes())?;
        }
        if dy < 0 {
            backend.write(format!("\x1b[{}A", -dy).as_bytes())?;
        } else if dy > 0 {
            backend.write(format!("\x1b[{dy}B").as_bytes())?;
        }
        Ok(())
    }

    /// Blank from the physical cursor to the end of the line.
    fn erase_to_end<B: TerminalBackend>(&mut self, backend: &mut B) -> Result<()> {
        let size = backend.size()?;
        let (x, y) = backend.cursor_position()?;
        backend.fill_blank(x, y, u32::from(size.width.saturating_sub(x)))
    }

    /// Wipe the screen and reset the retained state to a single blank line.
    pub fn clear<B: TerminalBackend>(&mut self, backend: &mut B) -> Result<()> {
        backend.write(b"\x1b[H\x1b[J")?;
        self.pos = (0, 0);
        self.screen = vec![String::new()];
        Ok(())
    }

    /// Park the cursor below the last non-empty row and open a fresh shell
    /// line.
    pub fn finish<B: TerminalBackend>(&mut self, backend: &mut B) -> Result<()> {
        let last = self
            .screen
            .iter()
            .rposition(|line| !line.is_empty())
            .map(|y| y as isize)
            .unwrap_or(-1);
        let target = last.min((self.height + self.offset) as isize - 1);
        self.move_relative(backend, 0, target)?;
        backend.write(b"\r\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::{Directive, RecordingBackend};
    use pretty_assertions::assert_eq;

    fn session(height: u16, width: u16) -> (RecordingBackend, RenderState, EventQueue) {
        let mut backend = RecordingBackend::new(height, width);
        let state = RenderState::prepare(&mut backend).unwrap();
        (backend, state, EventQueue::new())
    }

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn negative_coordinates_are_rejected() {
        let (mut backend, mut state, mut queue) = session(5, 80);
        let err = state
            .move_cursor(&mut backend, &mut queue, -1, 0)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::InvalidPosition { x: -1, y: 0 })
        ));
    }

    #[test]
    fn offscreen_row_queues_scroll_instead_of_moving() {
        let (mut backend, mut state, mut queue) = session(5, 80);
        state
            .refresh(&mut backend, &mut queue, rows(&["a"]), (0, 0))
            .unwrap();
        backend.clear_directives();

        state.move_cursor(&mut backend, &mut queue, 0, 9).unwrap();
        assert_eq!(backend.write_count(), 0);
        assert_eq!(queue.pop_front(), Some(Event::Scroll));
    }

    #[test]
    fn in_window_move_emits_minimal_relative_directives() {
        let (mut backend, mut state, mut queue) = session(5, 80);
        state
            .refresh(&mut backend, &mut queue, rows(&["abcdef", "ghij"]), (4, 0))
            .unwrap();
        backend.clear_directives();

        state.move_cursor(&mut backend, &mut queue, 1, 1).unwrap();
        assert_eq!(backend.written_text(), "\x1b[3D\x1b[1B");
        assert_eq!(state.cursor(), (1, 1));

        backend.clear_directives();
        state.move_cursor(&mut backend, &mut queue, 1, 1).unwrap();
        assert_eq!(backend.write_count(), 0, "zero deltas emit nothing");
    }

    #[test]
    fn escape_in_new_line_rehomes_cursor() {
        let (mut backend, mut state, mut queue) = session(5, 80);
        state
            .refresh(&mut backend, &mut queue, rows(&["plain"]), (0, 0))
            .unwrap();
        backend.clear_directives();

        state
            .refresh(
                &mut backend,
                &mut queue,
                rows(&["\x1b[1mbold\x1b[0m"]),
                (0, 0),
            )
            .unwrap();
        assert_eq!(state.cursor(), (0, 0));
        let text = backend.written_text();
        assert!(
            text.contains("\x1b[1mbold\x1b[0m"),
            "styled text written verbatim: {text:?}"
        );
    }

    #[test]
    fn shrinking_line_is_erased_to_end() {
        let (mut backend, mut state, mut queue) = session(5, 80);
        state
            .refresh(&mut backend, &mut queue, rows(&["longer line"]), (0, 0))
            .unwrap();
        backend.clear_directives();

        state
            .refresh(&mut backend, &mut queue, rows(&["long"]), (0, 0))
            .unwrap();
        assert!(
            backend
                .directives
                .iter()
                .any(|d| matches!(d, Directive::FillBlank { .. })),
            "expected an erase directive for the shortened line"
        );
    }

    #[test]
    fn clear_resets_tracked_state() {
        let (mut backend, mut state, mut queue) = session(5, 80);
        state
            .refresh(&mut backend, &mut queue, rows(&["abc", "def"]), (2, 1))
            .unwrap();
        state.clear(&mut backend).unwrap();
        assert_eq!(state.cursor(), (0, 0));
        assert_eq!(state.retained_rows(), 1);
        assert!(backend.written_text().ends_with("\x1b[H\x1b[J"));
    }

    #[test]
    fn finish_parks_below_content() {
        let (mut backend, mut state, mut queue) = session(5, 80);
        state
            .refresh(&mut backend, &mut queue, rows(&["abc", "def", ""]), (0, 0))
            .unwrap();
        backend.clear_directives();

        state.finish(&mut backend).unwrap();
        let text = backend.written_text();
        assert!(text.ends_with("\r\n"), "trailing line break: {text:?}");
    }
}
