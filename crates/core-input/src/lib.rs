//! Input translation: raw backend records to abstract events.
//!
//! [`next_event`] drains the pending queue first, then reduces one raw
//! record at a time: resize records yield immediately, key-up and non-key
//! records are discarded, key-down records run through the decoder. In
//! blocking mode the loop returns only once a meaningful event exists; it
//! is the single suspension point of the whole driver, a synchronous wait
//! on the backend's blocking read.
//!
//! A read fault is fatal and propagates; a record that maps to nothing is
//! not an error, just a discard.

pub mod keymap;

use anyhow::Result;
use core_events::{Event, EventQueue};
use core_terminal::{InputRecord, KeyRecord, TerminalBackend};
use tracing::trace;

const VK_BACKSPACE: u16 = 0x08;
const VK_ESCAPE: u16 = 0x1B;

/// Return the next abstract event.
///
/// A pending queued event is returned immediately regardless of `block`.
/// Otherwise raw records are consumed until one decodes; with `block` false
/// the first meaningless record ends the call with `Ok(None)`.
pub fn next_event<B: TerminalBackend>(
    queue: &mut EventQueue,
    backend: &mut B,
    block: bool,
) -> Result<Option<Event>> {
    if let Some(event) = queue.pop_front() {
        return Ok(Some(event));
    }

    loop {
        let Some(record) = backend.read_record()? else {
            if block {
                continue;
            }
            return Ok(None);
        };

        match record {
            InputRecord::Resize { .. } => return Ok(Some(Event::Resize)),
            InputRecord::Other => {
                trace!(target: "input.decode", "discarding non-key record");
            }
            InputRecord::Key(key) if !key.key_down => {
                trace!(target: "input.decode", vk = key.virtual_key, "discarding key-up record");
            }
            InputRecord::Key(key) => {
                if let Some(event) = decode_key(&key) {
                    return Ok(Some(event));
                }
                trace!(target: "input.decode", vk = key.virtual_key, "unmapped virtual key");
            }
        }

        if !block {
            return Ok(None);
        }
    }
}

/// Reduce one key-down record to an abstract event.
fn decode_key(key: &KeyRecord) -> Option<Event> {
    if key.ch == '\r' {
        // Normalize enter to a newline, independent of the host platform's
        // line-ending convention.
        return Some(Event::key("\n", "\n"));
    }
    if key.virtual_key == VK_BACKSPACE {
        return Some(Event::key("backspace", key.ch.to_string()));
    }
    if key.virtual_key == VK_ESCAPE {
        return Some(Event::key("escape", key.ch.to_string()));
    }
    if key.ch == '\0' {
        // Arrows, navigation, and function keys carry no character; the
        // symbolic-name table decides what they mean.
        return keymap::lookup(key.virtual_key).map(|name| Event::key(name, key.ch.to_string()));
    }
    Some(Event::key(key.ch.to_string(), key.ch.to_string()))
}
