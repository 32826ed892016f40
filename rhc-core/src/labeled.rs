//! Labeled vectors and label grouping.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::vector::Vector;

/// Bound satisfied by every class label type.
///
/// Labels are grouped in label order, so they must be `Ord`; trees are
/// grown across threads, so they must be `Send + Sync`.
pub trait Label: Ord + Clone + Debug + Send + Sync {}

impl<T: Ord + Clone + Debug + Send + Sync> Label for T {}

/// A feature vector tagged with a class label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledVector<L> {
    pub vector: Vector,
    pub label: L,
}

impl<L> LabeledVector<L> {
    pub fn new(label: L, features: Vec<f64>) -> Self {
        Self {
            vector: Vector::new(features),
            label,
        }
    }

    pub fn from_vector(label: L, vector: Vector) -> Self {
        Self { vector, label }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.vector.rank()
    }

    #[inline]
    pub fn features(&self) -> &[f64] {
        self.vector.features()
    }

    /// Compare positions only.
    pub fn eq_ignoring_label(&self, other: &Self) -> bool {
        self.vector == other.vector
    }
}

impl<L> AsRef<Vector> for LabeledVector<L> {
    fn as_ref(&self) -> &Vector {
        &self.vector
    }
}

impl<L> AsMut<Vector> for LabeledVector<L> {
    fn as_mut(&mut self) -> &mut Vector {
        &mut self.vector
    }
}

/// Partition `vectors` by label. Groups keep input order; the map iterates in
/// label order.
pub fn group_by_label<'a, L: Label>(
    vectors: impl IntoIterator<Item = &'a LabeledVector<L>>,
) -> BTreeMap<L, Vec<&'a LabeledVector<L>>>
where
    L: 'a,
{
    let mut groups: BTreeMap<L, Vec<&'a LabeledVector<L>>> = BTreeMap::new();
    for v in vectors {
        groups.entry(v.label.clone()).or_default().push(v);
    }
    groups
}

/// Distinct labels in first-seen order.
pub fn unique_labels<'a, L: Label + 'a>(
    vectors: impl IntoIterator<Item = &'a LabeledVector<L>>,
) -> Vec<L> {
    let mut labels: Vec<L> = Vec::new();
    for v in vectors {
        if !labels.contains(&v.label) {
            labels.push(v.label.clone());
        }
    }
    labels
}

pub fn with_label<'a, L: Label + 'a>(
    vectors: impl IntoIterator<Item = &'a LabeledVector<L>>,
    label: &'a L,
) -> impl Iterator<Item = &'a LabeledVector<L>> {
    vectors.into_iter().filter(move |v| &v.label == label)
}

pub fn without_label<'a, L: Label + 'a>(
    vectors: impl IntoIterator<Item = &'a LabeledVector<L>>,
    label: &'a L,
) -> impl Iterator<Item = &'a LabeledVector<L>> {
    vectors.into_iter().filter(move |v| &v.label != label)
}
