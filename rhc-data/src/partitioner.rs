//! Splitting a dataset into training and validation parts.

use rand::Rng;
use rhc_core::{Result, RhcError};

fn check_count(len: usize, count: usize, what: &str) -> Result<()> {
    if count > len {
        Err(RhcError::invalid_parameter(format!(
            "{what} {count} exceeds source length {len}"
        )))
    } else {
        Ok(())
    }
}

/// Deterministic split: walking `source` cyclically from `start_at`, the
/// first `first_count` elements form the first part and the rest the second.
pub fn partition<T: Clone>(
    source: &[T],
    start_at: usize,
    first_count: usize,
) -> Result<(Vec<T>, Vec<T>)> {
    check_count(source.len(), first_count, "first partition count")?;
    if source.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let start = start_at % source.len();
    let mut rotated = source[start..].iter().chain(&source[..start]).cloned();
    let first: Vec<T> = rotated.by_ref().take(first_count).collect();
    let second: Vec<T> = rotated.collect();
    Ok((first, second))
}

/// Consecutive groups whose sizes differ by at most one, larger groups first.
pub fn equal_partition<T: Clone>(source: &[T], groups: usize) -> Result<Vec<Vec<T>>> {
    if groups == 0 {
        return Err(RhcError::invalid_parameter("group count must be > 0"));
    }
    check_count(source.len(), groups, "group count")?;

    let base = source.len() / groups;
    let extra = source.len() % groups;
    let mut out = Vec::with_capacity(groups);
    let mut offset = 0;
    for g in 0..groups {
        let size = base + usize::from(g < extra);
        out.push(source[offset..offset + size].to_vec());
        offset += size;
    }
    Ok(out)
}

/// Draw `first_count` elements uniformly without replacement into the first
/// part; the second part keeps the remaining elements in source order.
pub fn random_partition<T: Clone, R: Rng + ?Sized>(
    source: &[T],
    first_count: usize,
    rng: &mut R,
) -> Result<(Vec<T>, Vec<T>)> {
    check_count(source.len(), first_count, "first partition count")?;

    let mut pool = source.to_vec();
    let mut first = Vec::with_capacity(first_count);
    while first.len() < first_count {
        let i = rng.gen_range(0..pool.len());
        first.push(pool.remove(i));
    }
    Ok((first, pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhc_core::SplitMix64;

    #[test]
    fn test_partition_wraps_around() {
        let source: Vec<u32> = (0..6).collect();
        let (a, b) = partition(&source, 4, 3).unwrap();
        assert_eq!(a, vec![4, 5, 0]);
        assert_eq!(b, vec![1, 2, 3]);

        let (a, b) = partition(&source, 13, 6).unwrap();
        assert_eq!(a, vec![1, 2, 3, 4, 5, 0]);
        assert!(b.is_empty());
    }

    #[test]
    fn test_partition_rejects_oversized_count() {
        let source = [1, 2, 3];
        assert!(matches!(
            partition(&source, 0, 4),
            Err(RhcError::InvalidParameter { .. })
        ));
        assert!(random_partition(&source, 4, &mut SplitMix64::new(1)).is_err());
        assert!(equal_partition(&source, 0).is_err());
        assert!(equal_partition(&source, 4).is_err());
    }

    #[test]
    fn test_equal_partition_sizes() {
        let source: Vec<u32> = (0..10).collect();
        let groups = equal_partition(&source, 3).unwrap();
        let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(groups.concat(), source);
    }

    #[test]
    fn test_random_partition_keeps_multiset() {
        let source: Vec<u32> = vec![5, 3, 3, 9, 1, 7, 7, 7, 2, 0];
        let mut rng = SplitMix64::new(2024);
        let (first, second) = random_partition(&source, 4, &mut rng).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 6);

        let mut all = [first, second].concat();
        all.sort_unstable();
        let mut expected = source.clone();
        expected.sort_unstable();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_random_partition_is_seeded() {
        let source: Vec<u32> = (0..50).collect();
        let a = random_partition(&source, 20, &mut SplitMix64::new(9)).unwrap();
        let b = random_partition(&source, 20, &mut SplitMix64::new(9)).unwrap();
        assert_eq!(a, b);
    }
}
