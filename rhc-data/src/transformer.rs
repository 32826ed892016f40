//! Dense matrix views of labeled vectors for external learners.

use std::collections::BTreeMap;

use rhc_core::{unique_labels, Label, LabeledVector};

/// Features and label encodings, row-aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed<L> {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<Vec<f64>>,
    /// Label → column (one-hot) or code (single column), in first-seen order.
    pub label_index: BTreeMap<L, usize>,
}

fn index_labels<L: Label>(vectors: &[LabeledVector<L>]) -> (Vec<L>, BTreeMap<L, usize>) {
    let order = unique_labels(vectors);
    let index: BTreeMap<L, usize> = order
        .iter()
        .enumerate()
        .map(|(i, l)| (l.clone(), i))
        .collect();
    (order, index)
}

/// One-hot label rows: `labels[i][j] = 1.0` iff vector `i` has label `j`.
pub fn transform<L: Label>(vectors: &[LabeledVector<L>]) -> Transformed<L> {
    let (order, label_index) = index_labels(vectors);
    let labels: Vec<Vec<f64>> = vectors
        .iter()
        .map(|v| {
            order
                .iter()
                .map(|l| if *l == v.label { 1.0 } else { 0.0 })
                .collect::<Vec<f64>>()
        })
        .collect();
    Transformed {
        features: vectors.iter().map(|v| v.features().to_vec()).collect(),
        labels,
        label_index,
    }
}

/// Single label column holding the label's code.
pub fn transform_with_one_label<L: Label>(vectors: &[LabeledVector<L>]) -> Transformed<L> {
    let (_, label_index) = index_labels(vectors);
    let labels: Vec<Vec<f64>> = vectors
        .iter()
        .map(|v| vec![label_index.get(&v.label).copied().unwrap_or(0) as f64])
        .collect();
    Transformed {
        features: vectors.iter().map(|v| v.features().to_vec()).collect(),
        labels,
        label_index,
    }
}
