//! Fisher discriminants attached to sphere nodes.
//!
//! A node whose uncovered vectors split cleanly into two classes can hold a
//! [`Discriminant`] instead of growing more children. During recognition the
//! discriminant answers with a [`PseudoSphere`]: a transient sphere on the
//! query's side of the decision point, sized so it stays inside the owner.
//!
//! ```text
//!        owner edge          decision point          owner edge
//!   c − h ───────────┬────────────  t  ────────────┬─────────── c + h
//!                  left pseudo                right pseudo
//!           (center mid-interval, radius = half the interval)
//! ```

use rhc_core::{Distance, Label, LabeledVector, Result, Vector};
use rhc_lda::{FisherModel, TwoClassData};

use crate::sphere::Sphere;

/// Fisher direction, decision point and the labels on each side of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminant<L> {
    model: FisherModel,
    left: L,
    right: L,
}

/// Fit a discriminant to two groups of vectors and keep it only if it
/// separates them completely.
///
/// `Ok(None)` means the projected groups interleave. A singular within-class
/// scatter is reported as `Err(SingularMatrix)`; callers growing a tree
/// treat that the same as "not separable".
pub fn is_completely_separated_with_discriminant<L: Label>(
    first: &[&LabeledVector<L>],
    second: &[&LabeledVector<L>],
) -> Result<Option<Discriminant<L>>> {
    let data = TwoClassData::new(
        first.iter().copied().map(LabeledVector::features),
        second.iter().copied().map(LabeledVector::features),
    )?;
    let model = FisherModel::fit(&data)?;
    if !model.separates(&data) {
        return Ok(None);
    }

    let first_label = first[0].label.clone();
    let second_label = second[0].label.clone();
    let (left, right) = if model.class0_on_left() {
        (first_label, second_label)
    } else {
        (second_label, first_label)
    };
    Ok(Some(Discriminant { model, left, right }))
}

impl<L: Label> Discriminant<L> {
    pub fn new(model: FisherModel, left: L, right: L) -> Self {
        Self { model, left, right }
    }

    pub fn model(&self) -> &FisherModel {
        &self.model
    }

    /// Unit discriminant direction.
    pub fn direction(&self) -> &[f64] {
        &self.model.w
    }

    pub fn decision_point(&self) -> f64 {
        self.model.threshold
    }

    /// Label of points projecting at or below the decision point.
    pub fn left_label(&self) -> &L {
        &self.left
    }

    pub fn right_label(&self) -> &L {
        &self.right
    }

    #[inline]
    fn is_left(&self, point: &[f64]) -> bool {
        self.model.project(point) <= self.model.threshold
    }

    /// Label of the side `point` falls on.
    pub fn label_for(&self, point: &[f64]) -> &L {
        if self.is_left(point) {
            &self.left
        } else {
            &self.right
        }
    }

    /// Pseudo-sphere answering a query that `owner` encloses.
    ///
    /// Along the direction, the owner covers `[c − h, c + h]` with `c` the
    /// projected owner center and `h` the length along the direction that
    /// `measure` reports as the owner radius (`h = √R` for squared
    /// Euclidean). The query's side of the decision point `t` cuts out
    /// `[c − h, t]` or `[t, c + h]`; the pseudo-sphere sits in the middle of
    /// that interval, reaching half its length. Its radius is that reach
    /// expressed back in `measure` units, so it compares directly with the
    /// radii of real spheres, and is clamped to `[0, R]`.
    pub fn classify<D: Distance + ?Sized>(
        &self,
        owner: &Sphere<L>,
        point: &[f64],
        measure: &D,
    ) -> PseudoSphere<L> {
        let w = &self.model.w;
        let c = self.model.project(owner.center().features());
        let t = self.model.threshold;
        let r = owner.radius();
        let h = reach(measure, w, r);

        let (label, edge) = if self.is_left(point) {
            (&self.left, c - h)
        } else {
            (&self.right, c + h)
        };

        let extent = ((t - edge).abs() * 0.5).min(h).max(0.0);
        let shift = (t + edge) * 0.5 - c;
        let features: Vec<f64> = owner
            .center()
            .features()
            .iter()
            .zip(w)
            .map(|(x, w)| x + w * shift)
            .collect();
        let radius = along(measure, w, extent).min(r).max(0.0);

        PseudoSphere {
            center: LabeledVector::new(label.clone(), features),
            radius,
        }
    }
}

/// `measure` from the origin to `s·w`.
fn along<D: Distance + ?Sized>(measure: &D, w: &[f64], s: f64) -> f64 {
    let origin = vec![0.0; w.len()];
    let step: Vec<f64> = w.iter().map(|x| x * s).collect();
    measure.distance_unchecked(&origin, &step)
}

/// Length `s` along the unit direction `w` with `along(w, s) = radius`.
///
/// Measures are taken as homogeneous, `along(w, s) = s^k · along(w, 1)`;
/// `k` is read off by doubling the step (1 for Euclidean and Minkowski, 2
/// for squared Euclidean). A degenerate measure leaves `radius` as is.
fn reach<D: Distance + ?Sized>(measure: &D, w: &[f64], radius: f64) -> f64 {
    let unit = along(measure, w, 1.0);
    let degree = (along(measure, w, 2.0) / unit).log2();
    if !(unit > 0.0 && degree.is_finite() && degree > 0.0) {
        return radius;
    }
    (radius / unit).powf(degree.recip())
}

/// Transient sphere produced by a discriminant during recognition. It is
/// never part of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoSphere<L> {
    center: LabeledVector<L>,
    radius: f64,
}

impl<L> PseudoSphere<L> {
    pub fn center(&self) -> &Vector {
        &self.center.vector
    }

    pub fn label(&self) -> &L {
        &self.center.label
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhc_core::{Euclidean, RhcError, SquaredEuclidean};

    fn lv(label: &'static str, features: &[f64]) -> LabeledVector<&'static str> {
        LabeledVector::new(label, features.to_vec())
    }

    fn split_groups() -> (Vec<LabeledVector<&'static str>>, Vec<LabeledVector<&'static str>>) {
        let a = vec![
            lv("A", &[0.1, 0.2]),
            lv("A", &[0.2, 0.4]),
            lv("A", &[0.15, 0.7]),
            lv("A", &[0.3, 0.5]),
        ];
        let b = vec![
            lv("B", &[0.7, 0.3]),
            lv("B", &[0.8, 0.6]),
            lv("B", &[0.9, 0.4]),
            lv("B", &[0.75, 0.8]),
        ];
        (a, b)
    }

    #[test]
    fn test_separated_groups_get_discriminant() {
        let (a, b) = split_groups();
        let ra: Vec<_> = a.iter().collect();
        let rb: Vec<_> = b.iter().collect();

        let d = is_completely_separated_with_discriminant(&ra, &rb)
            .unwrap()
            .expect("groups are linearly separable");
        assert_ne!(d.left_label(), d.right_label());

        for v in a.iter().chain(&b) {
            assert_eq!(d.label_for(v.features()), &v.label, "{:?}", v);
        }
        assert_eq!(d.label_for(&[0.05, 0.5]), &"A");
        assert_eq!(d.label_for(&[0.95, 0.5]), &"B");

        let norm: f64 = d.direction().iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interleaved_groups_have_no_discriminant() {
        let a = vec![lv("A", &[0.0, 0.0]), lv("A", &[1.0, 1.0]), lv("A", &[0.1, 0.0])];
        let b = vec![lv("B", &[1.0, 0.0]), lv("B", &[0.0, 1.0]), lv("B", &[0.9, 0.1])];
        let ra: Vec<_> = a.iter().collect();
        let rb: Vec<_> = b.iter().collect();
        assert_eq!(is_completely_separated_with_discriminant(&ra, &rb), Ok(None));
    }

    #[test]
    fn test_singular_scatter_is_an_error() {
        let a = vec![lv("A", &[0.2, 0.2])];
        let b = vec![lv("B", &[0.8, 0.8])];
        let ra: Vec<_> = a.iter().collect();
        let rb: Vec<_> = b.iter().collect();
        assert!(matches!(
            is_completely_separated_with_discriminant(&ra, &rb),
            Err(RhcError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_pseudo_sphere_stays_on_its_side() {
        let (a, b) = split_groups();
        let ra: Vec<_> = a.iter().collect();
        let rb: Vec<_> = b.iter().collect();
        let d = is_completely_separated_with_discriminant(&ra, &rb)
            .unwrap()
            .unwrap();
        let owner = Sphere::unit(&Euclidean, 2, "A");

        for (point, label) in [([0.05, 0.5], "A"), ([0.95, 0.5], "B")] {
            let pseudo = d.classify(&owner, &point, &Euclidean);
            assert_eq!(pseudo.label(), &label);
            assert!(pseudo.radius() > 0.0);
            assert!(pseudo.radius() <= owner.radius());
            assert_eq!(d.label_for(pseudo.center().features()), &label);
        }
    }

    #[test]
    fn test_pseudo_radius_follows_the_measure() {
        let (a, b) = split_groups();
        let ra: Vec<_> = a.iter().collect();
        let rb: Vec<_> = b.iter().collect();
        let d = is_completely_separated_with_discriminant(&ra, &rb)
            .unwrap()
            .unwrap();

        // same geometric sphere: R = √0.5 under Euclidean, 0.5 squared
        let linear = Sphere::unit(&Euclidean, 2, "A");
        let squared = Sphere::unit(&SquaredEuclidean, 2, "A");

        for point in [[0.05, 0.5], [0.95, 0.5]] {
            let pl = d.classify(&linear, &point, &Euclidean);
            let ps = d.classify(&squared, &point, &SquaredEuclidean);
            assert_eq!(pl.label(), ps.label());
            for (x, y) in pl.center().features().iter().zip(ps.center().features()) {
                assert!((x - y).abs() < 1e-9, "{x} vs {y}");
            }
            assert!(pl.radius() > 0.0);
            assert!((ps.radius() - pl.radius() * pl.radius()).abs() < 1e-9);
            assert!(ps.radius() <= squared.radius());
        }
    }

    #[test]
    fn test_reach_inverts_along() {
        let w = [0.6, 0.8];
        assert!((reach(&Euclidean, &w, 0.3) - 0.3).abs() < 1e-12);
        assert!((reach(&SquaredEuclidean, &w, 0.25) - 0.5).abs() < 1e-12);
        assert!((along(&SquaredEuclidean, &w, 0.5) - 0.25).abs() < 1e-12);
    }
}
