//! Repeated spawning until the tree stops growing.

use rhc_core::{Distance, Label, LabeledVector, Result, SplitMix64};
use tracing::{info, warn};

use crate::options::SpawnOptions;
use crate::sphere::Sphere;

/// Stopping criteria for [`train`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingLimits {
    /// Stop once the tree holds at least this many spheres.
    pub max_spheres: usize,
    /// Stop after this many passes.
    pub max_passes: usize,
}

impl Default for TrainingLimits {
    fn default() -> Self {
        TrainingLimits {
            max_spheres: 1_000_000,
            max_passes: 10_000,
        }
    }
}

/// What a [`train`] run did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrainingReport {
    /// Spheres created by each pass, in order. A converged run ends in 0.
    pub spawned_per_pass: Vec<usize>,
    pub sphere_count: usize,
    pub height: usize,
    pub discriminants: usize,
    /// Whether the last pass created nothing.
    pub converged: bool,
}

impl TrainingReport {
    pub fn passes(&self) -> usize {
        self.spawned_per_pass.len()
    }

    pub fn spawned(&self) -> usize {
        self.spawned_per_pass.iter().sum()
    }
}

/// Spawn passes over `vectors` until one creates nothing or a limit is hit.
pub fn train<L: Label, D: Distance + ?Sized>(
    root: &mut Sphere<L>,
    vectors: &[LabeledVector<L>],
    measure: &D,
    options: &SpawnOptions,
    limits: &TrainingLimits,
    rng: &mut SplitMix64,
) -> Result<TrainingReport> {
    let mut report = TrainingReport::default();

    while report.passes() < limits.max_passes {
        let created = root.spawn(vectors, measure, options, rng)?;
        report.spawned_per_pass.push(created);
        let spheres = root.sphere_count();
        info!(pass = report.passes(), created, spheres, "spawn pass done");

        if created == 0 {
            report.converged = true;
            break;
        }
        if spheres >= limits.max_spheres {
            warn!(spheres, limit = limits.max_spheres, "sphere limit reached");
            break;
        }
    }
    if !report.converged && report.passes() >= limits.max_passes {
        warn!(passes = report.passes(), "pass limit reached");
    }

    report.sphere_count = root.sphere_count();
    report.height = root.height();
    report.discriminants = root.discriminant_count();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LdaPolicy;
    use rhc_core::SquaredEuclidean;

    fn lv(label: &'static str, features: &[f64]) -> LabeledVector<&'static str> {
        LabeledVector::new(label, features.to_vec())
    }

    fn corners() -> Vec<LabeledVector<&'static str>> {
        vec![
            lv("A", &[0.0, 0.0]),
            lv("B", &[0.0, 1.0]),
            lv("A", &[1.0, 0.0]),
            lv("B", &[1.0, 1.0]),
        ]
    }

    #[test]
    fn test_train_converges() {
        let vectors = corners();
        let mut root = Sphere::unit(&SquaredEuclidean, 2, vectors[0].label);
        let report = train(
            &mut root,
            &vectors,
            &SquaredEuclidean,
            &SpawnOptions::default(),
            &TrainingLimits::default(),
            &mut SplitMix64::new(0),
        )
        .unwrap();

        assert!(report.converged);
        assert_eq!(report.spawned_per_pass, vec![1, 0]);
        assert_eq!(report.passes(), 2);
        assert_eq!(report.spawned(), 1);
        assert_eq!(report.sphere_count, 2);
        assert_eq!(report.height, 2);
        assert_eq!(report.discriminants, 0);
        assert_eq!(
            root.evaluate(&vectors, &SquaredEuclidean).unwrap().incorrect,
            0
        );
    }

    #[test]
    fn test_train_respects_limits() {
        let vectors = corners();
        let mut root = Sphere::unit(&SquaredEuclidean, 2, "A");
        let limits = TrainingLimits {
            max_spheres: 2,
            max_passes: 10,
        };
        let report = train(
            &mut root,
            &vectors,
            &SquaredEuclidean,
            &SpawnOptions::default(),
            &limits,
            &mut SplitMix64::new(0),
        )
        .unwrap();
        assert!(!report.converged);
        assert_eq!(report.passes(), 1);

        let mut root = Sphere::unit(&SquaredEuclidean, 2, "A");
        let limits = TrainingLimits {
            max_spheres: 100,
            max_passes: 1,
        };
        let report = train(
            &mut root,
            &vectors,
            &SquaredEuclidean,
            &SpawnOptions::default(),
            &limits,
            &mut SplitMix64::new(0),
        )
        .unwrap();
        assert!(!report.converged);
        assert_eq!(report.spawned_per_pass, vec![1]);
    }

    #[test]
    fn test_train_with_lda_reports_discriminants() {
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
        let report = train(
            &mut root,
            &vectors,
            &SquaredEuclidean,
            &SpawnOptions::default().with_lda(LdaPolicy::WhenChildless),
            &TrainingLimits::default(),
            &mut SplitMix64::new(0),
        )
        .unwrap();
        assert!(report.converged);
        assert_eq!(report.discriminants, 1);
        assert_eq!(report.sphere_count, 1);
    }
}
