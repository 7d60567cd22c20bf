//! Mutual-friend computation.

/// Returns the values present in both `a` and `b`.
///
/// Both inputs must be ascending and duplicate-free; the result is too.
/// Runs a two-pointer merge in `O(|a| + |b|)`: on a match the value at
/// the matching index is emitted before either pointer moves.
///
/// # Example
///
/// ```
/// use friendnet_core::graph::intersect;
///
/// assert_eq!(intersect(&[1, 2, 3, 5], &[2, 3, 4, 5]), vec![2, 3, 5]);
/// assert!(intersect::<u32>(&[], &[1, 2]).is_empty());
/// ```
#[must_use]
pub fn intersect<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut common = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                common.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    common
}
