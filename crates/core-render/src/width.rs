//! Display width of strings destined for the terminal.
//!
//! Widths come from `unicode-width`: wide East Asian glyphs count two
//! columns, combining marks and control characters count zero. CSI escape
//! sequences embedded in a line occupy no columns and are skipped wholesale,
//! so a styled line measures the same as its visible text.

use unicode_width::UnicodeWidthChar;

pub fn display_width(s: &str) -> usize {
    let mut cols = 0usize;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                // Parameter and intermediate bytes run until the final byte
                // in `@..=~`.
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        cols += ch.width().unwrap_or(0);
    }
    cols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_one_column_per_char() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("a日b"), 4);
    }

    #[test]
    fn combining_marks_take_no_columns() {
        assert_eq!(display_width("e\u{0301}"), 1);
    }

    #[test]
    fn csi_sequences_are_invisible() {
        assert_eq!(display_width("\x1b[1;31mred\x1b[0m"), 3);
        assert_eq!(display_width("\x1b[2K"), 0);
    }

    #[test]
    fn bare_escape_is_zero_width() {
        assert_eq!(display_width("\x1bx"), 1);
    }
}
