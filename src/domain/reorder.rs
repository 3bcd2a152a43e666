//! The move-one-element primitive behind every drag-and-drop style reorder.
//!
//! Gesture handling lives outside the crate; it only ever hands over a
//! `(source, destination)` pair. A missing destination means the item was
//! released outside any drop target.

/// Moves the element at `from` so that it ends up at index `to`.
///
/// Returns `true` when the sequence changed. The sequence is left untouched
/// when `to` is `None`, when either index is out of bounds, or when both
/// indices are equal.
pub fn reorder<T>(items: &mut Vec<T>, from: usize, to: Option<usize>) -> bool {
    let Some(to) = to else {
        return false;
    };

    if from >= items.len() || to >= items.len() || from == to {
        return false;
    }

    let item = items.remove(from);
    items.insert(to, item);
    true
}
