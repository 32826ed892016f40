//! Two-class Fisher linear discriminant.
//!
//! ```text
//! m_c  = mean of class c                         (c ∈ {0, 1})
//! S_c  = Σ_{x ∈ c} (x − m_c)(x − m_c)ᵀ           (class scatter)
//! S_w  = S_0 + S_1                               (within-class scatter)
//! w    = S_w⁻¹ (m_0 − m_1)                       (optionally unit length)
//! t    = wᵀ (m_0 + m_1) / 2                      (decision point)
//! ```
//!
//! The two classes are *completely separated* by `w` when the projected
//! intervals `[min_c, max_c]` do not interleave. Touching intervals count as
//! separated.

use rhc_core::{Result, RhcError};
use tracing::trace;

use crate::lapack::{dot, invert, Matrix};

/// Samples from exactly two classes, tagged 0 (first) and 1 (second).
#[derive(Debug, Clone)]
pub struct TwoClassData<'a> {
    dim: usize,
    rows: Vec<(&'a [f64], usize)>,
}

impl<'a> TwoClassData<'a> {
    /// Tag `first` as class 0 and `second` as class 1.
    ///
    /// Fails with EmptyInput if either class has no samples and RankMismatch
    /// if the samples disagree on dimensionality.
    pub fn new(
        first: impl IntoIterator<Item = &'a [f64]>,
        second: impl IntoIterator<Item = &'a [f64]>,
    ) -> Result<Self> {
        let mut rows: Vec<(&'a [f64], usize)> = first.into_iter().map(|x| (x, 0)).collect();
        let n0 = rows.len();
        rows.extend(second.into_iter().map(|x| (x, 1)));
        if n0 == 0 || rows.len() == n0 {
            return Err(RhcError::EmptyInput("two-class data needs samples in both classes"));
        }

        let dim = rows[0].0.len();
        if let Some((bad, _)) = rows.iter().find(|(x, _)| x.len() != dim) {
            return Err(RhcError::rank_mismatch(dim, bad.len()));
        }
        Ok(Self { dim, rows })
    }

    /// Feature dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Samples of class `c` (0 or 1).
    pub fn class(&self, c: usize) -> impl Iterator<Item = &'a [f64]> + '_ {
        self.rows
            .iter()
            .filter(move |(_, class)| *class == c)
            .map(|(x, _)| *x)
    }

    /// Per-feature mean of class `c`.
    pub fn class_mean(&self, c: usize) -> Vec<f64> {
        let mut mean = vec![0.0f64; self.dim];
        let mut count = 0usize;
        for x in self.class(c) {
            for (m, &v) in mean.iter_mut().zip(x) {
                *m += v;
            }
            count += 1;
        }
        for m in mean.iter_mut() {
            *m /= count as f64;
        }
        mean
    }

    /// Scatter matrix of class `c`: Σ (x − m)(x − m)ᵀ.
    pub fn scatter(&self, c: usize) -> Matrix {
        let mean = self.class_mean(c);
        let mut s = Matrix::zeros(self.dim, self.dim);
        let mut diff = vec![0.0f64; self.dim];
        for x in self.class(c) {
            for ((d, &v), &m) in diff.iter_mut().zip(x).zip(&mean) {
                *d = v - m;
            }
            s.add_outer(&diff);
        }
        s
    }

    /// Within-class scatter S_w = S_0 + S_1.
    pub fn within_class_scatter(&self) -> Matrix {
        let mut sw = self.scatter(0);
        sw.add_assign(&self.scatter(1));
        sw
    }

    /// Discriminant direction `w = S_w⁻¹ (m_0 − m_1)`.
    ///
    /// Fails with SingularMatrix when S_w cannot be inverted or the resulting
    /// direction is not finite (e.g. identical class means under `unitize`).
    pub fn discriminate(&self, unitize: bool) -> Result<Vec<f64>> {
        let m0 = self.class_mean(0);
        let m1 = self.class_mean(1);
        trace!(?m0, ?m1, "class means");

        let sw = self.within_class_scatter();
        trace!(?sw, "within-class scatter");

        let sw_inv = invert(&sw)?;
        let diff: Vec<f64> = m0.iter().zip(&m1).map(|(a, b)| a - b).collect();
        let mut w = sw_inv.mul_vec(&diff);

        if unitize {
            let norm = dot(&w, &w).sqrt();
            for x in w.iter_mut() {
                *x /= norm;
            }
        }

        if w.iter().all(|x| x.is_finite()) {
            Ok(w)
        } else {
            Err(RhcError::SingularMatrix { column: self.dim })
        }
    }

    /// Projection of the midpoint of the class means onto `w`.
    pub fn decision_point(&self, w: &[f64]) -> f64 {
        let m0 = self.class_mean(0);
        let m1 = self.class_mean(1);
        let mid: Vec<f64> = m0.iter().zip(&m1).map(|(a, b)| (a + b) * 0.5).collect();
        dot(w, &mid)
    }

    /// Whether the projections of the two classes onto `w` occupy
    /// non-interleaving intervals.
    pub fn is_completely_separated(&self, w: &[f64]) -> bool {
        let (min0, max0) = projected_range(self.class(0), w);
        let (min1, max1) = projected_range(self.class(1), w);
        (min0 <= min1 && max0 <= min1) || (min1 <= min0 && max1 <= min0)
    }
}

fn projected_range<'a>(xs: impl Iterator<Item = &'a [f64]>, w: &[f64]) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for x in xs {
        let p = dot(w, x);
        if p < min {
            min = p;
        }
        if p > max {
            max = p;
        }
    }
    (min, max)
}

/// A fitted two-class discriminant: unit direction, decision point and the
/// projected class-0 mean (which tells the sides apart).
#[derive(Debug, Clone, PartialEq)]
pub struct FisherModel {
    pub w: Vec<f64>,
    pub threshold: f64,
    pub mean0_projection: f64,
}

impl FisherModel {
    /// Fit a unit-length discriminant to `data`.
    pub fn fit(data: &TwoClassData<'_>) -> Result<Self> {
        let w = data.discriminate(true)?;
        let threshold = data.decision_point(&w);
        let mean0_projection = dot(&w, &data.class_mean(0));
        Ok(Self {
            w,
            threshold,
            mean0_projection,
        })
    }

    #[inline]
    pub fn project(&self, x: &[f64]) -> f64 {
        dot(&self.w, x)
    }

    /// Whether class 0 lies at or left of the decision point.
    #[inline]
    pub fn class0_on_left(&self) -> bool {
        self.mean0_projection <= self.threshold
    }

    /// Predicted class (0 or 1) for `x`. A projection exactly on the
    /// decision point goes to the left-hand class.
    pub fn predict(&self, x: &[f64]) -> usize {
        let left = self.project(x) <= self.threshold;
        if left == self.class0_on_left() {
            0
        } else {
            1
        }
    }

    pub fn separates(&self, data: &TwoClassData<'_>) -> bool {
        data.is_completely_separated(&self.w)
    }
}
