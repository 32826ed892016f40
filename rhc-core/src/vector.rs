//! Feature vectors: fixed-rank ordered tuples of `f64`.
//!
//! Equality is bit-exact per element (`==` on `f64`, no epsilon). The sphere
//! tree relies on this when it rejects a child whose center coincides with
//! its parent's, so a tolerance here would change which spheres get spawned.

use std::ops::Index;

use crate::error::{Result, RhcError};

/// An ordered tuple of real-valued features. The rank is fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector {
    features: Vec<f64>,
}

impl Vector {
    /// Create a vector owning `features`.
    pub fn new(features: Vec<f64>) -> Self {
        Self { features }
    }

    /// A vector of `rank` copies of `value`.
    pub fn filled(rank: usize, value: f64) -> Self {
        Self {
            features: vec![value; rank],
        }
    }

    /// Number of features.
    #[inline]
    pub fn rank(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn features(&self) -> &[f64] {
        &self.features
    }

    /// Feature at `index`, or `None` past the rank.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.features.get(index).copied()
    }

    /// Overwrite the feature at `index`.
    ///
    /// Panics if `index >= rank`; the rank never changes after construction.
    #[inline]
    pub fn set(&mut self, index: usize, value: f64) {
        self.features[index] = value;
    }

    /// Fail with RankMismatch unless `other` has the same rank.
    #[inline]
    pub fn check_rank(&self, other: &Vector) -> Result<()> {
        if self.rank() == other.rank() {
            Ok(())
        } else {
            Err(RhcError::rank_mismatch(self.rank(), other.rank()))
        }
    }

    pub fn into_features(self) -> Vec<f64> {
        self.features
    }
}

impl From<Vec<f64>> for Vector {
    fn from(features: Vec<f64>) -> Self {
        Self::new(features)
    }
}

impl From<&[f64]> for Vector {
    fn from(features: &[f64]) -> Self {
        Self::new(features.to_vec())
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.features[index]
    }
}

impl AsRef<Vector> for Vector {
    fn as_ref(&self) -> &Vector {
        self
    }
}

impl AsMut<Vector> for Vector {
    fn as_mut(&mut self) -> &mut Vector {
        self
    }
}

// ─────────────────────────────────────────────────────────────────────
// Collection operations
// ─────────────────────────────────────────────────────────────────────

/// Arithmetic mean of `vectors`, feature by feature.
///
/// Fails with EmptyInput on an empty slice and RankMismatch when the ranks
/// disagree with the first vector.
pub fn centroid<V: AsRef<Vector>>(vectors: &[V]) -> Result<Vector> {
    let first = vectors
        .first()
        .ok_or(RhcError::EmptyInput("centroid of an empty collection"))?
        .as_ref();

    let mut sums = vec![0.0f64; first.rank()];
    for v in vectors {
        let v = v.as_ref();
        first.check_rank(v)?;
        for (sum, &x) in sums.iter_mut().zip(v.features()) {
            *sum += x;
        }
    }

    let count = vectors.len() as f64;
    for sum in sums.iter_mut() {
        *sum /= count;
    }
    Ok(Vector::new(sums))
}

/// Per-feature `(min, max)` across `vectors`.
///
/// Fails with EmptyInput on an empty slice and RankMismatch on inconsistent
/// ranks.
pub fn feature_ranges<V: AsRef<Vector>>(vectors: &[V]) -> Result<Vec<(f64, f64)>> {
    let first = vectors
        .first()
        .ok_or(RhcError::EmptyInput("feature ranges of an empty collection"))?
        .as_ref();

    let mut ranges: Vec<(f64, f64)> = first.features().iter().map(|&x| (x, x)).collect();
    for v in &vectors[1..] {
        let v = v.as_ref();
        first.check_rank(v)?;
        for (range, &x) in ranges.iter_mut().zip(v.features()) {
            if x < range.0 {
                range.0 = x;
            }
            if x > range.1 {
                range.1 = x;
            }
        }
    }
    Ok(ranges)
}

/// Rescale every feature of `vectors` into `[0, 1]` in place using the
/// collection's per-feature min and max.
///
/// A feature that is constant across the collection has `max == min`; its
/// values become `0 / 0 = NaN`. Call [`feature_ranges`] first and drop or
/// special-case such columns when that matters. An empty slice is a no-op.
pub fn normalize<V: AsRef<Vector> + AsMut<Vector>>(vectors: &mut [V]) -> Result<()> {
    if vectors.is_empty() {
        return Ok(());
    }
    let ranges = feature_ranges(vectors)?;
    for v in vectors.iter_mut() {
        let v = v.as_mut();
        for (i, &(min, max)) in ranges.iter().enumerate() {
            let x = v.features[i];
            v.features[i] = (x - min) / (max - min);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_equality() {
        let a = Vector::new(vec![0.1, 0.2]);
        let b = Vector::new(vec![0.1, 0.2]);
        let c = Vector::new(vec![0.1, 0.2 + f64::EPSILON]);
        assert_eq!(a, b);
        assert_ne!(a, c, "equality carries no epsilon tolerance");
        assert_ne!(a, Vector::new(vec![0.1, 0.2, 0.0]));
    }

    #[test]
    fn test_centroid_single_element() {
        let v = Vector::new(vec![3.0, -1.5, 7.25]);
        assert_eq!(centroid(&[v.clone()]).unwrap(), v);
    }

    #[test]
    fn test_centroid_order_invariant() {
        let a = Vector::new(vec![0.0, 1.0]);
        let b = Vector::new(vec![2.0, 5.0]);
        let c = Vector::new(vec![4.0, 0.0]);
        let forward = centroid(&[&a, &b, &c]).unwrap();
        let backward = centroid(&[&c, &b, &a]).unwrap();
        assert_eq!(forward, Vector::new(vec![2.0, 2.0]));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_centroid_errors() {
        let empty: Vec<Vector> = Vec::new();
        assert!(matches!(centroid(&empty), Err(RhcError::EmptyInput(_))));

        let mixed = vec![Vector::new(vec![1.0, 2.0]), Vector::new(vec![1.0])];
        assert_eq!(
            centroid(&mixed),
            Err(RhcError::RankMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_normalize_unit_range() {
        let mut vs = vec![
            Vector::new(vec![2.0, 10.0]),
            Vector::new(vec![4.0, 20.0]),
            Vector::new(vec![6.0, 15.0]),
        ];
        normalize(&mut vs).unwrap();
        let first: Vec<f64> = vs.iter().map(|v| v[0]).collect();
        let second: Vec<f64> = vs.iter().map(|v| v[1]).collect();
        assert_eq!(first, vec![0.0, 0.5, 1.0]);
        assert_eq!(second, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_normalize_constant_feature_is_nan() {
        let mut vs = vec![Vector::new(vec![1.0, 3.0]), Vector::new(vec![2.0, 3.0])];
        normalize(&mut vs).unwrap();
        assert_eq!(vs[0][0], 0.0);
        assert_eq!(vs[1][0], 1.0);
        assert!(vs[0][1].is_nan());
        assert!(vs[1][1].is_nan());
    }

    #[test]
    fn test_normalize_rank_mismatch() {
        let mut vs = vec![Vector::new(vec![1.0, 3.0]), Vector::new(vec![2.0])];
        assert!(matches!(
            normalize(&mut vs),
            Err(RhcError::RankMismatch { .. })
        ));
    }

    #[test]
    fn test_feature_ranges() {
        let vs = vec![
            Vector::new(vec![1.0, -2.0]),
            Vector::new(vec![-1.0, 4.0]),
            Vector::new(vec![0.5, 0.0]),
        ];
        let ranges = feature_ranges(&vs).unwrap();
        assert_eq!(ranges, vec![(-1.0, 1.0), (-2.0, 4.0)]);
    }
}
