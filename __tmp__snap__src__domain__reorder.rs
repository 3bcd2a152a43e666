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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_forward() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(reorder(&mut items, 0, Some(2)));
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);
    }

    #[test]
    fn moves_backward() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(reorder(&mut items, 3, Some(0)));
        assert_eq!(items, vec!['d', 'a', 'b', 'c']);
    }

    #[test]
    fn missing_destination_is_noop() {
        let mut items = vec![1, 2, 3];
        assert!(!reorder(&mut items, 1, None));
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn out_of_bounds_is_noop() {
        let mut items = vec![1, 2, 3];
        assert!(!reorder(&mut items, 3, Some(0)));
        assert!(!reorder(&mut items, 0, Some(3)));
        assert_eq!(items, vec![1, 2, 3]);

        let mut empty: Vec<u8> = vec![];
        assert!(!reorder(&mut empty, 0, Some(0)));
    }

    #[test]
    fn every_valid_pair_keeps_elements_and_relative_order() {
        let original: Vec<u32> = (0..6).collect();

        for from in 0..original.len() {
            for to in 0..original.len() {
                let mut items = original.clone();
                reorder(&mut items, from, Some(to));

                assert_eq!(items.len(), original.len());
                assert_eq!(items[to], original[from]);

                let mut sorted = items.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, original);

                let rest: Vec<u32> = items.iter().copied().filter(|v| *v != original[from]).collect();
                let expected: Vec<u32> = original.iter().copied().filter(|v| *v != original[from]).collect();
                assert_eq!(rest, expected, "from {from} to {to}");
            }
        }
    }
}


