//! Bit-array permission encoding
//!
//! A permission set is a vector of unsigned words where bit `i` (counted
//! across words, least-significant word first) grants permission index `i`.
//! Vectors are compact enough to embed in JWT claims and cheap to combine.
//!
//! ```
//! use authorizer::Permissions;
//!
//! let read = Permissions::<u8>::from_index(0);
//! let write = Permissions::<u8>::from_index(9);
//! let granted = read.union(&write);
//!
//! assert!(granted.allows(&write));
//! assert!(granted.contains(9));
//! assert_eq!(granted.as_words(), &[0b0000_0001, 0b0000_0010]);
//! ```

mod codec;
mod word;

pub use codec::{generate, remove, sum, valid};
pub use word::PermissionWord;

use serde::{Deserialize, Serialize};

/// Owned permission bit-vector.
///
/// Serializes as a plain array of words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions<W: PermissionWord>(Vec<W>);

impl<W: PermissionWord> Permissions<W> {
    /// Empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set granting exactly `index`
    pub fn from_index(index: usize) -> Self {
        Self(generate(index))
    }

    /// Set granting every index in `indices`
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(sum(indices.into_iter().map(generate::<W>)))
    }

    pub fn as_words(&self) -> &[W] {
        &self.0
    }

    pub fn into_words(self) -> Vec<W> {
        self.0
    }

    /// Left-aligned union with `other`
    pub fn union(&self, other: &Self) -> Self {
        Self(sum([&self.0, &other.0]))
    }

    /// Right-aligned removal, see [`remove`]
    pub fn remove(&self, others: &[Self]) -> Self {
        Self(remove(&self.0, others.iter().map(|p| &p.0)))
    }

    /// Left-aligned set difference: every index in `other` is cleared,
    /// whatever the relative lengths.
    pub fn without(&self, other: &Self) -> Self {
        let words = self
            .0
            .iter()
            .enumerate()
            .map(|(i, word)| match other.0.get(i) {
                Some(cleared) => *word & !*cleared,
                None => *word,
            })
            .collect();
        Self(words)
    }

    /// Coarse overlap test, see [`valid`]
    pub fn allows(&self, required: &Self) -> bool {
        valid(&self.0, &required.0)
    }

    /// Exact test for a single index
    pub fn contains(&self, index: usize) -> bool {
        self.0
            .get(index / W::BITS)
            .map(|word| (*word & W::bit(index % W::BITS)) != W::ZERO)
            .unwrap_or(false)
    }

    /// True when no index is granted. Zero-valued trailing words still count
    /// as empty.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|word| *word == W::ZERO)
    }

    /// Number of granted indices
    pub fn len(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Granted indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().flat_map(|(i, word)| {
            let word = *word;
            (0..W::BITS)
                .filter(move |bit| (word & W::bit(*bit)) != W::ZERO)
                .map(move |bit| i * W::BITS + bit)
        })
    }
}

impl<W: PermissionWord> From<Vec<W>> for Permissions<W> {
    fn from(words: Vec<W>) -> Self {
        Self(words)
    }
}

impl<W: PermissionWord> FromIterator<usize> for Permissions<W> {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_indices(iter)
    }
}

/// A value carrying a granted permission vector, typically a token's custom
/// claims
pub trait PermissionBearer<W: PermissionWord> {
    fn permissions(&self) -> &[W];

    /// Overlap test against `required`, see [`valid`]
    fn has_permission(&self, required: &[W]) -> bool {
        valid(self.permissions(), required)
    }
}

impl<W: PermissionWord> PermissionBearer<W> for Permissions<W> {
    fn permissions(&self) -> &[W] {
        &self.0
    }
}

impl<W: PermissionWord> PermissionBearer<W> for Vec<W> {
    fn permissions(&self) -> &[W] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_indices() {
        let perms = Permissions::<u8>::from_indices([0, 3, 9]);
        assert_eq!(perms.as_words(), &[0b0000_1001, 0b0000_0010]);
        assert_eq!(perms.len(), 3);
    }

    #[test]
    fn test_contains_is_exact() {
        let perms: Permissions<u16> = [2usize, 20].into_iter().collect();
        assert!(perms.contains(2));
        assert!(perms.contains(20));
        assert!(!perms.contains(3));
        assert!(!perms.contains(500));
    }

    #[test]
    fn test_indices_round_trip() {
        let wanted = vec![0, 7, 8, 63, 64, 130];
        let perms = Permissions::<u64>::from_indices(wanted.clone());
        assert_eq!(perms.indices().collect::<Vec<_>>(), wanted);
    }

    #[test]
    fn test_remove_and_without_differ_on_unequal_lengths() {
        // Index 1 in a 1-word vector vs. index 9 in a 2-word origin.
        let origin = Permissions::<u8>::from_indices([1, 9]);
        let low = Permissions::<u8>::from_index(1);

        // Right-aligned: the single word lands on origin word 1 (index 9).
        let removed = origin.remove(&[low.clone()]);
        assert!(removed.contains(1));
        assert!(!removed.contains(9));

        // Left-aligned: index 1 itself is cleared.
        let without = origin.without(&low);
        assert!(!without.contains(1));
        assert!(without.contains(9));
    }

    #[test]
    fn test_is_empty_with_trailing_zero_words() {
        let perms = Permissions::<u32>::from_index(70);
        let cleared = perms.remove(&[perms.clone()]);
        assert_eq!(cleared.as_words().len(), 3);
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_serializes_as_word_array() {
        let perms = Permissions::<u16>::from_indices([1, 17]);
        let json = serde_json::to_string(&perms).unwrap();
        assert_eq!(json, "[2,2]");

        let back: Permissions<u16> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, perms);
    }

    #[test]
    fn test_permission_bearer() {
        struct Profile {
            permissions: Vec<u8>,
        }

        impl PermissionBearer<u8> for Profile {
            fn permissions(&self) -> &[u8] {
                &self.permissions
            }
        }

        let profile = Profile {
            permissions: vec![0b0000_0100, 0b0000_0001],
        };
        assert!(profile.has_permission(&generate::<u8>(8)));
        assert!(!profile.has_permission(&generate::<u8>(1)));
        assert!(Permissions::<u8>::from_index(2).has_permission(&[0b0000_0110]));
    }
}
