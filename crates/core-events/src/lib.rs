//! Abstract console events and the pending event queue.
//!
//! Events are the only datum shared between the display renderer and the
//! input translator: the renderer pushes a synthetic [`Event::Scroll`] at the
//! queue front when a requested cursor row falls outside the visible window,
//! and the translator drains the queue before it touches the backend. The
//! editor loop consumes events one at a time; there is no channel and no
//! concurrency here.

use std::collections::VecDeque;
use tracing::trace;

/// Abstract event consumed by the editor loop.
///
/// `Key::data` carries either the literal character (`"\n"`, `"a"`) or a
/// symbolic key name resolved by the translator's key table (`"left"`,
/// `"backspace"`). `raw` preserves the undecoded character payload of the
/// source record so callers can recover exactly what the terminal reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key { data: String, raw: String },
    /// Window geometry changed; the editor loop should re-prepare and redraw.
    Resize,
    /// A cursor target fell outside the viewport; a full refresh is required
    /// before the move can land.
    Scroll,
}

impl Event {
    pub fn key(data: impl Into<String>, raw: impl Into<String>) -> Self {
        Event::Key {
            data: data.into(),
            raw: raw.into(),
        }
    }
}

/// Pending event queue.
///
/// A small double-ended queue: synthetic events enter at the front and are
/// therefore returned before any backend-sourced event still pending.
/// Repeated front insertions are last-in-first-out.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Insert a synthetic high-priority event ahead of everything pending.
    pub fn push_front(&mut self, event: Event) {
        trace!(target: "events.queue", ?event, "push_front");
        self.events.push_front(event);
    }

    /// Append a backend-sourced event behind everything pending.
    pub fn push_back(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn pop_front(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn front_insertions_are_lifo() {
        let mut q = EventQueue::new();
        q.push_back(Event::key("a", "a"));
        q.push_front(Event::Resize);
        q.push_front(Event::Scroll);
        assert_eq!(q.pop_front(), Some(Event::Scroll));
        assert_eq!(q.pop_front(), Some(Event::Resize));
        assert_eq!(q.pop_front(), Some(Event::key("a", "a")));
        assert_eq!(q.pop_front(), None);
    }

    #[test]
    fn back_insertions_are_fifo() {
        let mut q = EventQueue::new();
        q.push_back(Event::key("a", "a"));
        q.push_back(Event::key("b", "b"));
        assert_eq!(q.pop_front(), Some(Event::key("a", "a")));
        assert_eq!(q.pop_front(), Some(Event::key("b", "b")));
        assert!(q.is_empty());
    }

    #[test]
    fn synthetic_scroll_precedes_pending_input() {
        let mut q = EventQueue::new();
        q.push_back(Event::key("x", "x"));
        q.push_front(Event::Scroll);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop_front(), Some(Event::Scroll));
    }
}
