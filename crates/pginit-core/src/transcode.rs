//! Reversible character substitution for database URLs.
//!
//! Connection URLs may legally carry characters inside credential or host
//! fields that a URL grammar treats as delimiters. Before parsing, every
//! unsafe character is swapped for a safe character that does not occur in
//! the input; after parsing, the swap is undone field by field.
//!
//! Character classes follow RFC 1738.

use thiserror::Error;

/// Punctuation that never collides with URL structure. `"` is excluded:
/// it belongs to the unsafe set.
const SAFE_PUNCTUATION: &[char] = &['$', '-', '_', '.', '+', '!', '*', '(', ')', ','];

/// Characters a URL grammar rejects or misreads inside a component.
pub const UNSAFE_CHARACTERS: &[char] = &[
    '"', '<', '>', '#', '%', '{', '}', '|', '\\', '^', '~', '[', ']', '`',
];

/// Structural delimiters. Never substituted; they keep their URL role.
pub const RESERVED_CHARACTERS: &[char] = &[';', ',', '/', '?', ':', '@', '=', '&'];

/// Master ordering of substitution candidates: punctuation first, then
/// lowercase and uppercase ASCII letters.
fn safe_characters() -> impl Iterator<Item = char> {
    SAFE_PUNCTUATION
        .iter()
        .copied()
        .chain('a'..='z')
        .chain('A'..='Z')
}

/// Distinct unsafe characters present in `s`, in first-occurrence order.
pub fn unsafe_characters_in(s: &str) -> Vec<char> {
    let mut found = Vec::new();
    for c in s.chars() {
        if UNSAFE_CHARACTERS.contains(&c) && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

/// Safe characters that do not occur in `s`, in master order.
pub fn safe_characters_absent_from(s: &str) -> Vec<char> {
    safe_characters().filter(|c| !s.contains(*c)).collect()
}

/// The input holds more distinct unsafe characters than there are unused
/// safe characters to stand in for them. Hard stop: a partial substitution
/// could not be reversed unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "not enough safe characters for translation: \
     {unsafe_found} unsafe characters found, {safe_available} safe characters available"
)]
pub struct CapacityExceeded {
    pub unsafe_found: usize,
    pub safe_available: usize,
}

/// Injective safe-to-unsafe pairing built for one input string.
///
/// Keys are safe characters absent from the original input, so applying
/// and reversing the map are exact inverses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    /// (safe stand-in, unsafe original)
    pairs: Vec<(char, char)>,
}

impl TranslationMap {
    /// Pair each unsafe character found in `s` with the next unused safe
    /// character.
    pub fn build(s: &str) -> Result<Self, CapacityExceeded> {
        let unsafe_found = unsafe_characters_in(s);
        let safe_available = safe_characters_absent_from(s);
        if unsafe_found.len() > safe_available.len() {
            return Err(CapacityExceeded {
                unsafe_found: unsafe_found.len(),
                safe_available: safe_available.len(),
            });
        }
        let pairs = safe_available.into_iter().zip(unsafe_found).collect();
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Replace every occurrence of each mapped unsafe character with its
    /// safe stand-in.
    pub fn apply(&self, s: &str) -> String {
        s.chars()
            .map(|c| {
                self.pairs
                    .iter()
                    .find(|(_, from)| *from == c)
                    .map_or(c, |(to, _)| *to)
            })
            .collect()
    }

    /// Replace every occurrence of each safe stand-in with its unsafe
    /// original. No-op for strings that contain no stand-ins.
    pub fn reverse(&self, s: &str) -> String {
        s.chars()
            .map(|c| {
                self.pairs
                    .iter()
                    .find(|(to, _)| *to == c)
                    .map_or(c, |(_, from)| *from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every safe character as one string: leaves zero substitution slots.
    fn all_safe_characters() -> String {
        safe_characters().collect()
    }

    #[test]
    fn discovery_first_occurrence_order() {
        assert_eq!(unsafe_characters_in("p%ss#w%rd"), vec!['%', '#']);
        assert_eq!(unsafe_characters_in("plain"), Vec::<char>::new());
    }

    #[test]
    fn absent_safe_characters_keep_master_order() {
        let absent = safe_characters_absent_from("user:password@host");
        // '$' is the first master candidate and does not occur in the input.
        assert_eq!(absent.first(), Some(&'$'));
        // 'a' occurs in "password", so it is filtered out.
        assert!(!absent.contains(&'a'));
    }

    #[test]
    fn apply_and_reverse_are_inverses() {
        let input = "postgresql://user:p@ss#w%rd@localhost:5432/mydb";
        let map = TranslationMap::build(input).unwrap();
        assert_eq!(map.len(), 2);

        let safe = map.apply(input);
        for c in UNSAFE_CHARACTERS {
            assert!(!safe.contains(*c), "unsafe {c:?} left in {safe:?}");
        }
        assert_eq!(map.reverse(&safe), input);
    }

    #[test]
    fn reserved_characters_are_untouched() {
        let input: String = RESERVED_CHARACTERS.iter().collect();
        let map = TranslationMap::build(&input).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.apply(&input), input);
    }

    #[test]
    fn capacity_exactly_equal_succeeds() {
        // Occupy all safe characters except the ten punctuation marks and
        // W..Z, leaving exactly 14 slots for the 14 unsafe characters.
        let mut input: String = ('a'..='z').chain('A'..='V').collect();
        input.extend(UNSAFE_CHARACTERS);

        let map = TranslationMap::build(&input).unwrap();
        assert_eq!(map.len(), UNSAFE_CHARACTERS.len());
        assert_eq!(map.reverse(&map.apply(&input)), input);
    }

    #[test]
    fn capacity_exceeded_is_a_hard_stop() {
        let input = format!("{}#", all_safe_characters());
        let err = TranslationMap::build(&input).unwrap_err();
        assert_eq!(err.unsafe_found, 1);
        assert_eq!(err.safe_available, 0);
    }

    #[test]
    fn empty_map_for_clean_input() {
        let map = TranslationMap::build("postgresql://u:p@h:5432/db").unwrap();
        assert!(map.is_empty());
        assert_eq!(map.apply("anything"), "anything");
    }
}
