//! Console driver facade.
//!
//! [`Console`] ties the terminal backend, the display renderer, and the
//! input translator together behind the one surface an editor loop
//! consumes: prepare a session, refresh the screen after each keystroke,
//! pull the next event, finish. The renderer and translator never call each
//! other; their only link is the synthetic scroll event passed through the
//! pending queue, which the editor loop must answer with another refresh.
//!
//! ```no_run
//! use core_terminal::CrosstermBackend;
//! use oxrepl::{Console, Event};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut console = Console::new(CrosstermBackend::new());
//! console.prepare()?;
//! loop {
//!     console.refresh(vec![">>> ".into()], (4, 0))?;
//!     match console.next_event(true)? {
//!         Some(Event::Key { data, .. }) if data == "escape" => break,
//!         Some(Event::Resize) => console.prepare()?,
//!         Some(Event::Scroll) | Some(Event::Key { .. }) | None => {}
//!     }
//! }
//! console.finish()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use core_terminal::{TerminalBackend, WindowSize};

pub use core_events::{Event, EventQueue};
pub use core_render::{RenderError, RenderState, width::display_width};
pub use core_terminal::{CrosstermBackend, InputRecord, KeyRecord, RecordingBackend};

/// One console session over a terminal backend.
pub struct Console<B: TerminalBackend> {
    backend: B,
    queue: EventQueue,
    state: Option<RenderState>,
}

impl<B: TerminalBackend> Console<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            queue: EventQueue::new(),
            state: None,
        }
    }

    /// Start (or restart) a session: enter raw mode and allocate rendering
    /// state from the current geometry. Safe to call again after a resize.
    pub fn prepare(&mut self) -> Result<()> {
        self.backend.enter()?;
        self.state = Some(RenderState::prepare(&mut self.backend)?);
        Ok(())
    }

    fn parts(&mut self) -> Result<(&mut RenderState, &mut B, &mut EventQueue)> {
        let state = self
            .state
            .as_mut()
            .context("console session not prepared")?;
        Ok((state, &mut self.backend, &mut self.queue))
    }

    /// Repaint the window to show `screen` with the cursor at `cursor`
    /// (column, row) in virtual coordinates.
    pub fn refresh(&mut self, screen: Vec<String>, cursor: (usize, usize)) -> Result<()> {
        let (state, backend, queue) = self.parts()?;
        state.refresh(backend, queue, screen, cursor)
    }

    /// Move the cursor, or queue a scroll event when the row is outside the
    /// window. Negative coordinates are a caller error.
    pub fn move_cursor(&mut self, x: isize, y: isize) -> Result<()> {
        let (state, backend, queue) = self.parts()?;
        state.move_cursor(backend, queue, x, y)
    }

    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        self.backend.set_cursor_visible(visible)
    }

    /// Wipe the screen and reset the retained rendering state.
    pub fn clear(&mut self) -> Result<()> {
        let (state, backend, _) = self.parts()?;
        state.clear(backend)
    }

    /// Blank `width * height` cells starting at `(x, y)` and reset their
    /// attributes.
    pub fn clear_range(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<()> {
        let count = u32::from(width) * u32::from(height);
        self.backend.fill_blank(x, y, count)?;
        self.backend.fill_default_attr(x, y, count)
    }

    /// End the session: park the cursor below the visible content, emit a
    /// trailing line break, and leave raw mode.
    pub fn finish(&mut self) -> Result<()> {
        let (state, backend, _) = self.parts()?;
        state.finish(backend)?;
        self.state = None;
        self.backend.leave()
    }

    /// Next abstract event; `Ok(None)` only when `block` is false.
    pub fn next_event(&mut self, block: bool) -> Result<Option<Event>> {
        core_input::next_event(&mut self.queue, &mut self.backend, block)
    }

    pub fn beep(&mut self) -> Result<()> {
        self.backend.beep()
    }

    /// Current window geometry.
    pub fn size(&mut self) -> Result<WindowSize> {
        self.backend.size()
    }

    /// Window height of the active session.
    pub fn height(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.height())
    }
}
