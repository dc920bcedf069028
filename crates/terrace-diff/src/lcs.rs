//! Longest-common-subsequence computation over identity sequences.
//!
//! The differ keys every comparison on stable identities, so the LCS of two
//! id sequences is exactly the set of entries that survive an update in
//! order. Everything outside it becomes a delete (source side) or an insert
//! (target side).

/// Returns the longest common subsequence of `a` and `b` as `(index in a,
/// index in b)` pairs, in order.
///
/// Common prefix and suffix are matched greedily before the quadratic table
/// is built, so the typical "append a few rows" update costs almost nothing.
pub(crate) fn longest_common_subsequence<T: PartialEq>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    let mut prefix = 0;
    while prefix < a.len() && prefix < b.len() && a[prefix] == b[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < a.len() - prefix
        && suffix < b.len() - prefix
        && a[a.len() - 1 - suffix] == b[b.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let inner_a = &a[prefix..a.len() - suffix];
    let inner_b = &b[prefix..b.len() - suffix];
    let n = inner_a.len();
    let m = inner_b.len();

    let mut pairs = Vec::with_capacity(prefix + suffix + n.min(m));
    pairs.extend((0..prefix).map(|i| (i, i)));

    if n > 0 && m > 0 {
        // lengths[i][j] = LCS length of inner_a[i..] and inner_b[j..].
        let width = m + 1;
        let mut lengths = vec![0usize; (n + 1) * width];
        for i in (0..n).rev() {
            for j in (0..m).rev() {
                lengths[i * width + j] = if inner_a[i] == inner_b[j] {
                    lengths[(i + 1) * width + j + 1] + 1
                } else {
                    lengths[(i + 1) * width + j].max(lengths[i * width + j + 1])
                };
            }
        }

        let (mut i, mut j) = (0, 0);
        while i < n && j < m {
            if inner_a[i] == inner_b[j] {
                pairs.push((prefix + i, prefix + j));
                i += 1;
                j += 1;
            } else if lengths[(i + 1) * width + j] >= lengths[i * width + j + 1] {
                i += 1;
            } else {
                j += 1;
            }
        }
    }

    pairs.extend((0..suffix).map(|k| (a.len() - suffix + k, b.len() - suffix + k)));
    pairs
}
