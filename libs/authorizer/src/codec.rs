//! Free-standing bit-vector operations.
//!
//! Vectors are slices of words, least-significant word first: bit `i` of the
//! vector lives in word `i / W::BITS` at position `i % W::BITS`.

use crate::word::PermissionWord;

/// Build a vector granting exactly one permission index.
///
/// The result has `bit_index / W::BITS + 1` words with a single bit set in the
/// last one.
pub fn generate<W: PermissionWord>(bit_index: usize) -> Vec<W> {
    let mut words = vec![W::ZERO; bit_index / W::BITS + 1];
    if let Some(last) = words.last_mut() {
        *last = W::bit(bit_index % W::BITS);
    }
    words
}

/// Union of all vectors.
///
/// Vectors are left-aligned: word 0 is combined with word 0. The output is as
/// long as the longest input; missing words count as zero.
pub fn sum<W, I, V>(vectors: I) -> Vec<W>
where
    W: PermissionWord,
    I: IntoIterator<Item = V>,
    V: AsRef<[W]>,
{
    let mut out: Vec<W> = Vec::new();
    for vector in vectors {
        let words = vector.as_ref();
        if words.len() > out.len() {
            out.resize(words.len(), W::ZERO);
        }
        for (slot, word) in out.iter_mut().zip(words) {
            *slot = *slot | *word;
        }
    }
    out
}

/// Clear every bit of each subtrahend from `origin`.
///
/// Subtrahends are right-aligned against `origin`: word `j` of a subtrahend of
/// length `n` is applied to word `origin.len() - n + j`. A subtrahend longer
/// than `origin` is skipped. This alignment differs from [`sum`] and existing
/// stored vectors depend on it; use [`crate::Permissions::without`] for a
/// left-aligned difference.
pub fn remove<W, I, V>(origin: &[W], subtrahends: I) -> Vec<W>
where
    W: PermissionWord,
    I: IntoIterator<Item = V>,
    V: AsRef<[W]>,
{
    let mut out = origin.to_vec();
    for subtrahend in subtrahends {
        let words = subtrahend.as_ref();
        if words.len() > out.len() {
            continue;
        }
        let offset = out.len() - words.len();
        for (slot, word) in out[offset..].iter_mut().zip(words) {
            *slot = *slot & !*word;
        }
    }
    out
}

/// True when `origin` and `permission` share a set bit at any common word
/// position.
///
/// This is a coarse overlap test: a multi-bit `permission` passes if any one
/// of its bits is granted.
pub fn valid<W: PermissionWord>(origin: &[W], permission: &[W]) -> bool {
    origin
        .iter()
        .zip(permission)
        .any(|(granted, required)| (*granted & *required) != W::ZERO)
}
