//! Binary search primitives over caller-sorted slices
//!
//! All queries take three-way comparators so the same sorted sequence can
//! be probed by different key projections. Comparators answer "how does
//! this element compare to the target": `Less` means the element sorts
//! before the target.

use std::cmp::Ordering;

/// Find an element comparing equal to the target
pub fn find<T, F>(items: &[T], cmp: F) -> Option<&T>
where
    F: Fn(&T) -> Ordering,
{
    let idx = rank(items, &cmp);
    items.get(idx).filter(|item| cmp(item) == Ordering::Equal)
}

/// Index of an element comparing equal to the target, if any
pub fn position<T, F>(items: &[T], cmp: F) -> Option<usize>
where
    F: Fn(&T) -> Ordering,
{
    let idx = rank(items, &cmp);
    match items.get(idx) {
        Some(item) if cmp(item) == Ordering::Equal => Some(idx),
        _ => None,
    }
}

/// Insertion point for the target: the first index whose element is not Less
pub fn rank<T, F>(items: &[T], cmp: F) -> usize
where
    F: Fn(&T) -> Ordering,
{
    let mut lo = 0usize;
    let mut hi = items.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(&items[mid]) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Half-open slice of elements between a lower and an upper bound
///
/// `lower` positions the first element not Less than the lower target;
/// `upper` positions the first element not Less than the upper target.
pub fn range<'a, T, L, U>(items: &'a [T], lower: L, upper: U) -> &'a [T]
where
    L: Fn(&T) -> Ordering,
    U: Fn(&T) -> Ordering,
{
    let start = rank(items, lower);
    let end = rank(&items[start..], upper) + start;
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_key(target: i32) -> impl Fn(&i32) -> Ordering {
        move |item| item.cmp(&target)
    }

    #[test]
    fn test_find_exact() {
        let items = [1, 3, 5, 7, 9];
        assert_eq!(find(&items, by_key(5)), Some(&5));
        assert_eq!(find(&items, by_key(4)), None);
        assert_eq!(find(&items, by_key(1)), Some(&1));
        assert_eq!(find(&items, by_key(9)), Some(&9));
        assert_eq!(find::<i32, _>(&[], by_key(1)), None);
    }

    #[test]
    fn test_rank_insertion_point() {
        let items = [1, 3, 5, 7];
        assert_eq!(rank(&items, by_key(0)), 0);
        assert_eq!(rank(&items, by_key(3)), 1);
        assert_eq!(rank(&items, by_key(4)), 2);
        assert_eq!(rank(&items, by_key(8)), 4);
    }

    #[test]
    fn test_range_half_open() {
        let items = [1, 2, 4, 4, 5, 8];
        // All elements in [4, 8)
        let slice = range(&items, by_key(4), by_key(8));
        assert_eq!(slice, &[4, 4, 5]);
        // Empty window
        let slice = range(&items, by_key(6), by_key(7));
        assert!(slice.is_empty());
    }

    #[test]
    fn test_range_string_prefix() {
        let items = ["alpha", "beta", "betamax", "bets", "gamma"];
        let slice = range(
            &items,
            |item| item.cmp(&"beta"),
            |item| {
                if item.starts_with("beta") {
                    Ordering::Less
                } else {
                    item.cmp(&"beta")
                }
            },
        );
        assert_eq!(slice, &["beta", "betamax"]);
    }
}
