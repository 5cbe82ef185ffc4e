//! The 31-multiplier rolling hash used for every fingerprint component.

/// `h = h * 31 + c` over the UTF-16 code units of `s`, wrapping at 32 bits.
///
/// Matches the hash browsers compute client-side, so a server-rendered
/// canvas and a client-reported one are directly comparable.
pub fn rolling_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_hashes_to_zero() {
        assert_eq!(rolling_hash(""), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 97 * 31 + 98);
        // same result as Java's String.hashCode
        assert_eq!(rolling_hash("hello"), 99162322);
    }

    #[test]
    fn test_wraps_instead_of_overflowing() {
        let long = "z".repeat(1000);
        assert_ne!(rolling_hash(&long), 0);
        assert_eq!(rolling_hash(&long), rolling_hash(&long));
    }

    #[test]
    fn test_hashes_utf16_units() {
        // U+1F3A8 is a surrogate pair: two units
        let expected = 0xD83Ci32.wrapping_mul(31).wrapping_add(0xDFA8);
        assert_eq!(rolling_hash("\u{1F3A8}"), expected);
    }
}
