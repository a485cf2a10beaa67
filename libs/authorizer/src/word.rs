//! Word types a permission vector can be built from.

use std::fmt::Debug;
use std::ops::{BitAnd, BitOr, Not};

mod sealed {
    pub trait Sealed {}
}

/// Unsigned integer used as one word of a permission bit-vector.
///
/// Implemented for `u8`, `u16`, `u32` and `u64`. The width is fixed at
/// compile time so every vector operation is monomorphised per word size.
pub trait PermissionWord:
    sealed::Sealed
    + Copy
    + Eq
    + Default
    + Debug
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Number of bits in one word
    const BITS: usize;

    /// Word with no bit set
    const ZERO: Self;

    /// Word with only bit `position` set. `position` must be below `BITS`.
    fn bit(position: usize) -> Self;

    /// Number of set bits
    fn count_ones(self) -> u32;
}

macro_rules! impl_permission_word {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl PermissionWord for $ty {
                const BITS: usize = <$ty>::BITS as usize;
                const ZERO: Self = 0;

                #[inline]
                fn bit(position: usize) -> Self {
                    debug_assert!(position < <Self as PermissionWord>::BITS);
                    1 << position
                }

                #[inline]
                fn count_ones(self) -> u32 {
                    <$ty>::count_ones(self)
                }
            }
        )*
    };
}

impl_permission_word!(u8, u16, u32, u64);
