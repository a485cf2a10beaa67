//! Slice lookup helpers

/// Index of the first element equal to `value`
pub fn find<T: PartialEq>(items: &[T], value: &T) -> Option<usize> {
    items.iter().position(|item| item == value)
}

/// First element matching `predicate`, with its index
pub fn find_by<T, F>(items: &[T], mut predicate: F) -> Option<(usize, &T)>
where
    F: FnMut(&T) -> bool,
{
    items.iter().enumerate().find(|(_, item)| predicate(item))
}
