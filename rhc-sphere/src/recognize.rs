//! Recognition: the smallest sphere enclosing a query point.
//!
//! The root always answers, even for points outside it. Below the root a
//! subtree only answers if its node encloses the point; among enclosing
//! candidates the strictly smaller radius wins, so on ties the first child in
//! insertion order keeps the answer. A node with a discriminant answers with
//! a pseudo-sphere and its children are not searched.

use rhc_core::{Distance, Label, LabeledVector, Result, Vector};
use tracing::trace;

use crate::discriminant::PseudoSphere;
use crate::sphere::{NodePath, Sphere};

/// Outcome of [`Sphere::recognize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition<'a, L> {
    /// A node of the tree.
    Sphere { node: &'a Sphere<L>, path: NodePath },
    /// A discriminant on `owner` placed the point on one of its sides.
    Discriminant {
        owner: &'a Sphere<L>,
        path: NodePath,
        pseudo: PseudoSphere<L>,
    },
}

impl<'a, L: Label> Recognition<'a, L> {
    pub fn label(&self) -> &L {
        match self {
            Recognition::Sphere { node, .. } => node.label(),
            Recognition::Discriminant { pseudo, .. } => pseudo.label(),
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            Recognition::Sphere { node, .. } => node.radius(),
            Recognition::Discriminant { pseudo, .. } => pseudo.radius(),
        }
    }

    pub fn center(&self) -> &Vector {
        match self {
            Recognition::Sphere { node, .. } => node.center(),
            Recognition::Discriminant { pseudo, .. } => pseudo.center(),
        }
    }

    /// Path of the answering node (the discriminant's owner for pseudo
    /// answers).
    pub fn path(&self) -> &[usize] {
        match self {
            Recognition::Sphere { path, .. } | Recognition::Discriminant { path, .. } => path,
        }
    }

    /// The tree node behind the answer.
    pub fn node(&self) -> &'a Sphere<L> {
        match self {
            Recognition::Sphere { node, .. } => *node,
            Recognition::Discriminant { owner, .. } => *owner,
        }
    }

    pub fn is_pseudo(&self) -> bool {
        matches!(self, Recognition::Discriminant { .. })
    }
}

/// Tally of [`Sphere::evaluate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: usize,
    pub incorrect: usize,
}

impl Evaluation {
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Fraction recognized correctly; 0 for an empty evaluation.
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.correct as f64 / n as f64,
        }
    }
}

impl<L: Label> Sphere<L> {
    /// Smallest sphere (or discriminant pseudo-sphere) enclosing `point`,
    /// treating this node as the root.
    pub fn recognize<D: Distance + ?Sized>(
        &self,
        point: &Vector,
        measure: &D,
    ) -> Result<Recognition<'_, L>> {
        self.center.vector.check_rank(point)?;
        let mut path = Vec::new();
        Ok(self
            .descend(point.features(), measure, &mut path)
            .unwrap_or(Recognition::Sphere {
                node: self,
                path: Vec::new(),
            }))
    }

    /// Label of [`recognize`](Self::recognize).
    pub fn recognize_as_label<D: Distance + ?Sized>(&self, point: &Vector, measure: &D) -> Result<L> {
        Ok(self.recognize(point, measure)?.label().clone())
    }

    /// Recognize every vector and count label agreements.
    pub fn evaluate<D: Distance + ?Sized>(
        &self,
        vectors: &[LabeledVector<L>],
        measure: &D,
    ) -> Result<Evaluation> {
        let mut eval = Evaluation::default();
        for v in vectors {
            let hit = self.recognize(&v.vector, measure)?;
            let ok = hit.label() == &v.label;
            trace!(
                expected = ?v.label,
                actual = ?hit.label(),
                radius = hit.radius(),
                pseudo = hit.is_pseudo(),
                ok,
                "recognized"
            );
            if ok {
                eval.correct += 1;
            } else {
                eval.incorrect += 1;
            }
        }
        Ok(eval)
    }

    fn descend<'a, D: Distance + ?Sized>(
        &'a self,
        point: &[f64],
        measure: &D,
        path: &mut NodePath,
    ) -> Option<Recognition<'a, L>> {
        if !self.encloses_unchecked(point, measure) {
            return None;
        }
        if let Some(d) = &self.discriminant {
            return Some(Recognition::Discriminant {
                owner: self,
                path: path.clone(),
                pseudo: d.classify(self, point, measure),
            });
        }

        let mut best = Recognition::Sphere {
            node: self,
            path: path.clone(),
        };
        for (i, child) in self.children.iter().enumerate() {
            path.push(i);
            if let Some(candidate) = child.descend(point, measure, path) {
                if candidate.radius() < best.radius() {
                    best = candidate;
                }
            }
            path.pop();
        }
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{LdaPolicy, SpawnOptions};
    use rhc_core::{normalize, Euclidean, RhcError, SplitMix64, SquaredEuclidean};

    fn lv(label: &'static str, features: &[f64]) -> LabeledVector<&'static str> {
        LabeledVector::new(label, features.to_vec())
    }

    fn v(features: &[f64]) -> Vector {
        Vector::new(features.to_vec())
    }

    fn trained_corners() -> Sphere<&'static str> {
        let mut vectors = vec![
            lv("A", &[0.0, 0.0]),
            lv("A", &[1.0, 0.0]),
            lv("B", &[0.0, 1.0]),
            lv("B", &[1.0, 1.0]),
        ];
        normalize(&mut vectors).unwrap();
        let mut root = Sphere::unit(&SquaredEuclidean, 2, vectors[0].label);
        let mut rng = SplitMix64::new(0);
        while root
            .spawn(&vectors, &SquaredEuclidean, &SpawnOptions::default(), &mut rng)
            .unwrap()
            > 0
        {}
        root
    }

    #[test]
    fn test_corners_recognized() {
        let root = trained_corners();
        assert_eq!(
            root.recognize_as_label(&v(&[0.1, 0.1]), &SquaredEuclidean)
                .unwrap(),
            "A"
        );
        assert_eq!(
            root.recognize_as_label(&v(&[0.9, 0.9]), &SquaredEuclidean)
                .unwrap(),
            "B"
        );

        let hit = root.recognize(&v(&[0.9, 0.9]), &SquaredEuclidean).unwrap();
        assert_eq!(hit.path(), &[0]);
        assert!(!hit.is_pseudo());
    }

    #[test]
    fn test_outside_root_falls_back_to_root() {
        let root = trained_corners();
        let hit = root.recognize(&v(&[5.0, 5.0]), &SquaredEuclidean).unwrap();
        assert_eq!(hit.label(), &"A");
        assert!(hit.path().is_empty());
        assert_eq!(hit.radius(), root.radius());
    }

    #[test]
    fn test_smallest_enclosing_wins() {
        let mut root = Sphere::unit(&Euclidean, 2, "A");
        let mut outer = Sphere::new(lv("B", &[0.5, 0.5]), 0.3);
        outer.add_child(Sphere::new(lv("C", &[0.55, 0.5]), 0.1));
        root.add_child(outer);
        root.add_child(Sphere::new(lv("D", &[0.5, 0.5]), 0.2));

        let hit = root.recognize(&v(&[0.55, 0.52]), &Euclidean).unwrap();
        assert_eq!(hit.label(), &"C");
        assert_eq!(hit.path(), &[0, 0]);
        assert_eq!(hit.node().depth(), 2);

        // outside C, inside both B and D: D is smaller
        let hit = root.recognize(&v(&[0.4, 0.5]), &Euclidean).unwrap();
        assert_eq!(hit.label(), &"D");
    }

    #[test]
    fn test_radius_ties_keep_first_child() {
        let mut root = Sphere::unit(&Euclidean, 2, "A");
        root.add_child(Sphere::new(lv("B", &[0.4, 0.5]), 0.2));
        root.add_child(Sphere::new(lv("C", &[0.6, 0.5]), 0.2));
        assert_eq!(
            root.recognize_as_label(&v(&[0.5, 0.5]), &Euclidean).unwrap(),
            "B"
        );
    }

    #[test]
    fn test_discriminant_answers_with_pseudo_sphere() {
        let vectors = vec![
            lv("A", &[0.1, 0.2]),
            lv("A", &[0.2, 0.4]),
            lv("A", &[0.15, 0.7]),
            lv("A", &[0.3, 0.5]),
            lv("B", &[0.7, 0.3]),
            lv("B", &[0.8, 0.6]),
            lv("B", &[0.9, 0.4]),
            lv("B", &[0.75, 0.8]),
        ];
        let mut root = Sphere::unit(&SquaredEuclidean, 2, "A");
        root.spawn_with_lda(&vectors, &SquaredEuclidean, LdaPolicy::WhenChildless)
            .unwrap();

        let left = root.recognize(&v(&[0.05, 0.5]), &SquaredEuclidean).unwrap();
        assert!(left.is_pseudo());
        assert_eq!(left.label(), &"A");
        assert!(left.radius() <= root.radius());

        let right = root.recognize(&v(&[0.95, 0.5]), &SquaredEuclidean).unwrap();
        assert_eq!(right.label(), &"B");

        let eval = root.evaluate(&vectors, &SquaredEuclidean).unwrap();
        assert_eq!(eval.correct, vectors.len());
        assert_eq!(eval.accuracy(), 1.0);
    }

    #[test]
    fn test_evaluate_counts() {
        let root = trained_corners();
        let probes = vec![
            lv("A", &[0.1, 0.1]),
            lv("B", &[0.9, 0.9]),
            lv("B", &[0.1, 0.1]),
        ];
        let eval = root.evaluate(&probes, &SquaredEuclidean).unwrap();
        assert_eq!(
            eval,
            Evaluation {
                correct: 2,
                incorrect: 1
            }
        );
        assert_eq!(eval.total(), 3);
        assert_eq!(Evaluation::default().accuracy(), 0.0);
    }

    #[test]
    fn test_rank_mismatch() {
        let root = trained_corners();
        assert!(matches!(
            root.recognize(&v(&[0.5, 0.5, 0.5]), &SquaredEuclidean),
            Err(RhcError::RankMismatch { .. })
        ));
    }
}
