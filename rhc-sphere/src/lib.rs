//! # rhc-sphere
//!
//! Recursive hypersphere classifier: a tree of labeled spheres grown from
//! training vectors, queried by "smallest enclosing sphere".
//!
//! 1. **Spawn**: one growth pass. Every node looks at the training vectors
//!    it encloses that none of its children cover, and proposes one child
//!    per foreign label. Passes repeat until one creates nothing
//!    ([`train`] drives that loop).
//!
//! 2. **Recognize**: descend from the root through enclosing spheres and
//!    answer with the smallest one; the root answers for everything else.
//!
//! 3. **LDA**: optionally, a node whose uncovered vectors form two
//!    linearly separable classes keeps a Fisher discriminant instead of
//!    growing children, and answers queries with a pseudo-sphere.
//!
//! ## Design
//!
//! - Children are owned; a node is addressed by its [`NodePath`]
//! - Generic over the label type and any [`rhc_core::Distance`]
//! - Parallel spawning fans the root's children out on scoped threads; every
//!   child recursion gets its own generator fork, so results do not depend
//!   on the concurrency mode
//!
//! ```
//! use rhc_core::{LabeledVector, SplitMix64, SquaredEuclidean, Vector};
//! use rhc_sphere::{train, SpawnOptions, Sphere, TrainingLimits};
//!
//! let vectors = vec![
//!     LabeledVector::new("A", vec![0.0, 0.0]),
//!     LabeledVector::new("B", vec![0.0, 1.0]),
//!     LabeledVector::new("A", vec![1.0, 0.0]),
//!     LabeledVector::new("B", vec![1.0, 1.0]),
//! ];
//! let mut root = Sphere::unit(&SquaredEuclidean, 2, "A");
//! let report = train(
//!     &mut root,
//!     &vectors,
//!     &SquaredEuclidean,
//!     &SpawnOptions::default(),
//!     &TrainingLimits::default(),
//!     &mut SplitMix64::new(7),
//! )
//! .unwrap();
//! assert!(report.converged);
//!
//! let label = root
//!     .recognize_as_label(&Vector::new(vec![0.9, 0.9]), &SquaredEuclidean)
//!     .unwrap();
//! assert_eq!(label, "B");
//! ```

pub mod discriminant;
pub mod options;
pub mod recognize;
pub mod spawn;
pub mod sphere;
pub mod train;

pub use discriminant::{is_completely_separated_with_discriminant, Discriminant, PseudoSphere};
pub use options::{CollisionStrategy, Concurrency, LdaPolicy, SpawnOptions, SpawnRule};
pub use recognize::{Evaluation, Recognition};
pub use sphere::{NodePath, Sphere};
pub use train::{train, TrainingLimits, TrainingReport};
