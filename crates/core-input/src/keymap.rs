//! Symbolic names for non-character virtual keys.
//!
//! This table is configuration data, not behavior: the decoding contract in
//! the translator does not change when entries are added. Entries are sorted
//! by code and unique, so lookup is a binary search.

/// Virtual-key code to symbolic name.
pub const VIRTUAL_KEY_NAMES: &[(u16, &str)] = &[
    (0x21, "page up"),
    (0x22, "page down"),
    (0x23, "end"),
    (0x24, "home"),
    (0x25, "left"),
    (0x26, "up"),
    (0x27, "right"),
    (0x28, "down"),
    (0x2D, "insert"),
    (0x2E, "delete"),
    (0x70, "f1"),
    (0x71, "f2"),
    (0x72, "f3"),
    (0x73, "f4"),
    (0x74, "f5"),
    (0x75, "f6"),
    (0x76, "f7"),
    (0x77, "f8"),
    (0x78, "f9"),
    (0x79, "f10"),
    (0x7A, "f11"),
    (0x7B, "f12"),
    (0x7C, "f13"),
    (0x7D, "f14"),
    (0x7E, "f15"),
    (0x7F, "f16"),
    (0x80, "f17"),
    (0x81, "f18"),
    (0x82, "f19"),
    (0x83, "f20"),
];

/// Resolve a virtual-key code to its symbolic name, if mapped.
pub fn lookup(code: u16) -> Option<&'static str> {
    VIRTUAL_KEY_NAMES
        .binary_search_by_key(&code, |&(c, _)| c)
        .ok()
        .map(|i| VIRTUAL_KEY_NAMES[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_collision_free() {
        for pair in VIRTUAL_KEY_NAMES.windows(2) {
            assert!(
                pair[0].0 < pair[1].0,
                "codes must be strictly increasing: {:#x} then {:#x}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn arrows_and_function_keys_resolve() {
        assert_eq!(lookup(0x25), Some("left"));
        assert_eq!(lookup(0x28), Some("down"));
        assert_eq!(lookup(0x70), Some("f1"));
        assert_eq!(lookup(0x83), Some("f20"));
    }

    #[test]
    fn unmapped_codes_miss() {
        assert_eq!(lookup(0x00), None);
        assert_eq!(lookup(0x2F), None);
        assert_eq!(lookup(0xFF), None);
    }
}
