//! Set-algebra properties of the permission codec, checked for every word
//! width over the first few hundred indices.

use authorizer::{generate, remove, sum, valid, PermissionWord, Permissions};

const MAX_INDEX: usize = 200;

fn set_bits<W: PermissionWord>(words: &[W]) -> Vec<usize> {
    Permissions::from(words.to_vec()).indices().collect()
}

fn check_generate_sets_one_bit<W: PermissionWord>() {
    for i in 0..MAX_INDEX {
        let words = generate::<W>(i);
        assert_eq!(words.len(), i / W::BITS + 1, "length for index {i}");
        assert_eq!(set_bits(&words), vec![i], "bits for index {i}");
    }
}

fn check_sum_then_valid<W: PermissionWord>() {
    for a in (0..MAX_INDEX).step_by(7) {
        for b in (0..MAX_INDEX).step_by(11) {
            let granted = sum::<W, _, _>([generate::<W>(a), generate::<W>(b)]);
            assert!(valid(&granted, &generate::<W>(a)), "a={a} b={b}");
            assert!(valid(&granted, &generate::<W>(b)), "a={a} b={b}");
        }
    }
}

fn check_remove_clears<W: PermissionWord>() {
    for a in 0..MAX_INDEX {
        let granted = sum::<W, _, _>([generate::<W>(a)]);
        let cleared = remove(&granted, [generate::<W>(a)]);
        assert!(cleared.iter().all(|w| *w == W::ZERO), "index {a}");
    }
}

fn check_sum_is_union<W: PermissionWord>() {
    let indices = [0usize, 5, 31, 32, 64, 99, 150];
    let granted = sum::<W, _, _>(indices.iter().map(|i| generate::<W>(*i)));
    assert_eq!(set_bits(&granted), indices.to_vec());
    assert_eq!(granted.len(), 150 / W::BITS + 1);
}

macro_rules! width_tests {
    ($($name:ident => $ty:ty),*) => {
        $(
            mod $name {
                use super::*;

                #[test]
                fn generate_sets_exactly_one_bit() {
                    check_generate_sets_one_bit::<$ty>();
                }

                #[test]
                fn sum_is_valid_for_each_member() {
                    check_sum_then_valid::<$ty>();
                }

                #[test]
                fn remove_of_same_index_is_zero() {
                    check_remove_clears::<$ty>();
                }

                #[test]
                fn sum_is_union() {
                    check_sum_is_union::<$ty>();
                }
            }
        )*
    };
}

width_tests!(words_u8 => u8, words_u16 => u16, words_u32 => u32, words_u64 => u64);

#[test]
fn test_unrelated_permission_is_not_valid() {
    let granted = Permissions::<u32>::from_indices([1, 40]);
    assert!(!granted.allows(&Permissions::from_index(2)));
    assert!(!granted.allows(&Permissions::from_index(41)));
    assert!(!granted.allows(&Permissions::new()));
}
