use std::cmp::Ordering;

/// Insertion sort for slices with natural ordering.
///
/// Stable, in-place, O(n²) worst case and O(n) on already-sorted input. The
/// collation layer sorts object key lists, which are almost always short and
/// nearly sorted; for those shapes this beats the stdlib driver.
///
/// # Examples
///
/// ```
/// use confdrift_util::sort::insertion_sort;
///
/// let mut keys = vec!["resourceType", "accountId", "resourceId"];
/// insertion_sort(&mut keys);
/// assert_eq!(keys, vec!["accountId", "resourceId", "resourceType"]);
/// ```
pub fn insertion_sort<T: Ord>(arr: &mut [T]) {
    for i in 1..arr.len() {
        let mut j = i;
        while j > 0 && arr[j - 1] > arr[j] {
            arr.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Insertion sort with a custom comparator. Stable: equal elements keep
/// their input order, which the collation layer relies on when two values
/// serialize to the same key.
///
/// # Examples
///
/// ```
/// use confdrift_util::sort::insertion_sort_by;
///
/// let mut arr = vec![3, 1, 2];
/// insertion_sort_by(&mut arr, |a, b| b.cmp(a));
/// assert_eq!(arr, vec![3, 2, 1]);
/// ```
pub fn insertion_sort_by<T, F>(arr: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..arr.len() {
        let mut j = i;
        while j > 0 && compare(&arr[j - 1], &arr[j]) == Ordering::Greater {
            arr.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_and_single() {
        let mut empty: Vec<i32> = vec![];
        insertion_sort(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![7];
        insertion_sort(&mut one);
        assert_eq!(one, vec![7]);
    }

    #[test]
    fn duplicates_kept() {
        let mut arr = vec![2, 1, 2, 1];
        insertion_sort(&mut arr);
        assert_eq!(arr, vec![1, 1, 2, 2]);
    }

    #[test]
    fn stable_under_equal_keys() {
        // Sort pairs by first element only; second element records input order.
        let mut arr = vec![(1, 'b'), (0, 'x'), (1, 'a')];
        insertion_sort_by(&mut arr, |a, b| a.0.cmp(&b.0));
        assert_eq!(arr, vec![(0, 'x'), (1, 'b'), (1, 'a')]);
    }

    proptest! {
        #[test]
        fn matches_stdlib_sort(mut arr in proptest::collection::vec(any::<i64>(), 0..64)) {
            let mut expected = arr.clone();
            expected.sort();
            insertion_sort(&mut arr);
            prop_assert_eq!(arr, expected);
        }
    }
}
