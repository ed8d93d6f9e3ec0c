//! In-place quicksort over the accumulator's value buffer.
//!
//! The one-shot aggregate path batch-sorts the whole buffer exactly once,
//! at result time; after that the buffer is kept ordered incrementally and
//! this module is never consulted again for that accumulator.

/// Sort `a` into non-decreasing order.
///
/// Recursive quicksort with a three-way (Dutch-flag) partition: entries
/// below the pivot are packed to the left, entries above it migrate past a
/// shrinking upper boundary, and equal-to-pivot runs stay in place and are
/// never recursed into. The pivot is the middle element adjusted toward
/// the median of first, middle, and last, which avoids quadratic behavior
/// on already-sorted and reverse-sorted input.
///
/// Index arithmetic is kept explicit rather than expressed through
/// iterator adapters so the partition scheme stays recognizable.
pub(crate) fn sort_doubles(a: &mut [f64]) {
    let n = a.len();
    if n < 2 {
        return;
    }
    if a[0] > a[n - 1] {
        a.swap(0, n - 1);
    }
    if n == 2 {
        return;
    }
    // Entries at or after a[gt] are greater than the pivot.
    let mut gt = n - 1;
    let mid = n / 2;
    if a[0] > a[mid] {
        a.swap(0, mid);
    } else if a[mid] > a[gt] {
        a.swap(mid, gt);
    }
    if n == 3 {
        return;
    }
    let pivot = a[mid];
    // Entries before a[lt] are less than the pivot.
    let mut lt = 1;
    let mut i = 1;
    loop {
        if a[i] < pivot {
            if i > lt {
                a.swap(i, lt);
            }
            lt += 1;
            i += 1;
        } else if a[i] > pivot {
            loop {
                gt -= 1;
                if gt <= i || a[gt] <= pivot {
                    break;
                }
            }
            a.swap(i, gt);
        } else {
            i += 1;
        }
        if i >= gt {
            break;
        }
    }
    if lt >= 2 {
        sort_doubles(&mut a[..lt]);
    }
    if n - gt >= 2 {
        sort_doubles(&mut a[gt..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sorted(a: &[f64]) {
        for w in a.windows(2) {
            assert!(w[0] <= w[1], "out of order: {} > {}", w[0], w[1]);
        }
    }

    fn check(mut a: Vec<f64>) {
        let mut expected = a.clone();
        expected.sort_by(f64::total_cmp);
        sort_doubles(&mut a);
        assert_sorted(&a);
        assert_eq!(a, expected);
    }

    #[test]
    fn trivial_lengths() {
        check(vec![]);
        check(vec![5.0]);
        check(vec![2.0, 1.0]);
        check(vec![1.0, 2.0]);
        check(vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn already_sorted() {
        check((0..100).map(f64::from).collect());
    }

    #[test]
    fn reverse_sorted() {
        check((0..100).rev().map(f64::from).collect());
    }

    #[test]
    fn heavy_duplicates() {
        check(vec![5.0; 64]);
        check([1.0, 2.0, 2.0, 2.0, 1.0, 3.0, 2.0, 1.0, 3.0, 3.0].to_vec());
        let mut mixed = Vec::new();
        for i in 0..200 {
            mixed.push(f64::from(i % 3));
        }
        check(mixed);
    }

    #[test]
    fn negative_and_fractional() {
        check(vec![0.5, -1.25, 3.0, -1.25, 0.0, 2.75, -10.0]);
    }

    #[test]
    fn pseudo_random() {
        // Deterministic LCG so the fixture never changes between runs.
        let mut seed: u64 = 0x9e37_79b9;
        let mut a = Vec::with_capacity(1000);
        for _ in 0..1000 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            a.push(((seed >> 33) as f64) / 1e6);
        }
        check(a);
    }

    #[test]
    fn idempotent_on_sorted_input() {
        let mut a: Vec<f64> = (0..50).map(f64::from).collect();
        sort_doubles(&mut a);
        let first = a.clone();
        sort_doubles(&mut a);
        assert_eq!(a, first);
    }
}
