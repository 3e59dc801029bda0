//! Terminal capability probing.
//!
//! A minimal set of booleans the renderer consults when deciding whether to
//! use scroll-region directives or fall back to a full repaint. Detection
//! runs once per session and is deliberately optimistic: every terminal
//! crossterm drives understands the ANSI scroll directives we emit. The
//! struct is non-exhaustive so later capabilities (truecolor, bracketed
//! paste, kitty keyboard) can be added without breaking downstream code.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    pub supports_scroll_region: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self {
            supports_scroll_region: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_enables_scroll_region() {
        assert!(TerminalCapabilities::detect().supports_scroll_region);
    }
}
