//! # rhc-core
//!
//! Shared primitives for the recursive hypersphere classifier workspace.
//!
//! This crate provides:
//! - **Vectors**: fixed-rank feature tuples with exact equality, centroid and
//!   in-place `[0, 1]` normalisation.
//! - **Labeled vectors**: features plus a class label, with label grouping.
//! - **Distance measures**: Euclidean, squared Euclidean and Minkowski-p
//!   behind one `Distance` trait; closures work too.
//! - **Radial sorting**: order a collection by distance from a focus point.
//! - **SplitMix64**: the seeded generator threaded through randomized calls.
//! - **Fan-out**: scoped-thread helper used by parallel spawning.

pub mod distance;
pub mod error;
pub mod labeled;
pub mod parallel;
pub mod rng;
pub mod sorter;
pub mod vector;

pub use distance::{Distance, Euclidean, Measure, Minkowski, SquaredEuclidean};
pub use error::{Result, RhcError};
pub use labeled::{group_by_label, unique_labels, with_label, without_label, Label, LabeledVector};
pub use parallel::fan_out_mut;
pub use rng::SplitMix64;
pub use sorter::{closest, furthest, radial_sort, SortOrder};
pub use vector::{centroid, feature_ranges, normalize, Vector};
