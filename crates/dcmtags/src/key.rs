//! Attribute keys
//!
//! A [`TagKey`] is the (group, element) pair that identifies one attribute in
//! a DICOM record. Keys order by group, then element, which is also the order
//! in which attributes appear in a well-formed file.

use std::fmt;

/// Identifies one attribute by its (group, element) numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagKey {
    pub group: u16,
    pub element: u16,
}

impl TagKey {
    /// Sentinel for identifiers that could not be resolved.
    pub const UNDEFINED: TagKey = TagKey::new(0xFFFF, 0xFFFF);

    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    pub fn is_undefined(self) -> bool {
        self == Self::UNDEFINED
    }

    /// The key immediately after this one in file order.
    pub fn successor(self) -> TagKey {
        if self.element == 0xFFFF {
            TagKey::new(self.group.wrapping_add(1), 0x0000)
        } else {
            TagKey::new(self.group, self.element + 1)
        }
    }

    /// Parse the literal `gggg,eeee` form (hex, surrounding whitespace allowed).
    ///
    /// Returns `None` when the text is not a pair of hex numbers, so the
    /// caller can fall back to a keyword lookup.
    pub fn parse_hex_pair(text: &str) -> Option<TagKey> {
        let (group, element) = text.trim().split_once(',')?;
        let group = parse_hex_u16(group)?;
        let element = parse_hex_u16(element)?;
        Some(TagKey::new(group, element))
    }
}

fn parse_hex_u16(text: &str) -> Option<u16> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if text.is_empty() || text.len() > 4 {
        return None;
    }
    u16::from_str_radix(text, 16).ok()
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04x},{:04x})", self.group, self.element)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_hex_pair() {
        assert_eq!(TagKey::parse_hex_pair("0008,0060"), Some(TagKey::new(0x0008, 0x0060)));
        assert_eq!(TagKey::parse_hex_pair(" 7fe0,0010 "), Some(TagKey::new(0x7FE0, 0x0010)));
        assert_eq!(TagKey::parse_hex_pair("0x0010,0x0010"), Some(TagKey::new(0x0010, 0x0010)));
        assert_eq!(TagKey::parse_hex_pair("PatientName"), None);
        assert_eq!(TagKey::parse_hex_pair("0008,"), None);
        assert_eq!(TagKey::parse_hex_pair("00080,0060"), None);
    }

    #[test]
    fn test_successor_wraps_element_into_next_group() {
        assert_eq!(TagKey::new(0x0020, 0x4000).successor(), TagKey::new(0x0020, 0x4001));
        assert_eq!(TagKey::new(0x0009, 0xFFFF).successor(), TagKey::new(0x000A, 0x0000));
    }

    #[test]
    fn test_display() {
        assert_eq!(TagKey::new(0x0008, 0x103E).to_string(), "(0008,103e)");
        assert!(TagKey::UNDEFINED.is_undefined());
    }

    proptest! {
        #[test]
        fn prop_hex_pair_always_parses(group in any::<u16>(), element in any::<u16>()) {
            let text = format!("{:04x},{:04X}", group, element);
            prop_assert_eq!(TagKey::parse_hex_pair(&text), Some(TagKey::new(group, element)));
        }

        #[test]
        fn prop_successor_is_strictly_greater(group in 0u16..0xFFFF, element in any::<u16>()) {
            let key = TagKey::new(group, element);
            prop_assert!(key.successor() > key);
        }
    }
}
