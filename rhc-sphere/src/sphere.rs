//! The hypersphere node and whole-tree queries.
//!
//! ```text
//! root  center=(0.5, 0.5)  R=0.5  label=A
//! ├── child  center=(0.5, 1.0)  R=0.25  label=B
//! │   └── ...
//! └── child  ...
//! ```
//!
//! Children are owned by their parent. The parent link is positional: a
//! node is addressed by its [`NodePath`] (child indices from the root), and
//! [`Sphere::ancestors`] walks that path back up.

use std::fmt::Write as _;
use std::io;

use rhc_core::{centroid, Distance, Label, LabeledVector, Result, RhcError, Vector};

use crate::discriminant::Discriminant;

/// Child indices leading from the root to a node. The root is `[]`.
pub type NodePath = Vec<usize>;

// ─────────────────────────────────────────────────────────────────────
// Sphere
// ─────────────────────────────────────────────────────────────────────

/// A labeled hypersphere with nested child spheres.
///
/// A point belongs to the sphere when `distance(center, point) ≤ radius`
/// under the measure the tree is trained with.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere<L> {
    pub(crate) center: LabeledVector<L>,
    pub(crate) radius: f64,
    pub(crate) children: Vec<Sphere<L>>,
    pub(crate) discriminant: Option<Discriminant<L>>,
    pub(crate) depth: usize,
}

impl<L: Label> Sphere<L> {
    /// Stand-alone sphere; its label is the center's label.
    pub fn new(center: LabeledVector<L>, radius: f64) -> Self {
        Self {
            center,
            radius,
            children: Vec::new(),
            discriminant: None,
            depth: 0,
        }
    }

    /// Root over the unit hypercube: center `(0.5, …, 0.5)`, radius the
    /// distance from the origin to that center.
    pub fn unit<D: Distance + ?Sized>(measure: &D, rank: usize, label: L) -> Self {
        let center = Vector::filled(rank, 0.5);
        let origin = Vector::filled(rank, 0.0);
        let radius = measure.distance_unchecked(origin.features(), center.features());
        Self::new(LabeledVector::from_vector(label, center), radius)
    }

    /// Root centered on the centroid of `vectors`, just large enough to
    /// enclose all of them.
    pub fn bounding<D: Distance + ?Sized>(
        vectors: &[LabeledVector<L>],
        measure: &D,
        label: L,
    ) -> Result<Self> {
        if vectors.is_empty() {
            return Err(RhcError::EmptyInput("bounding sphere needs at least one vector"));
        }
        let center = centroid(vectors)?;
        let radius = vectors
            .iter()
            .map(|v| measure.distance_unchecked(center.features(), v.features()))
            .fold(0.0f64, f64::max);
        Ok(Self::new(LabeledVector::from_vector(label, center), radius))
    }

    pub fn center(&self) -> &Vector {
        &self.center.vector
    }

    pub fn label(&self) -> &L {
        &self.center.label
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn rank(&self) -> usize {
        self.center.rank()
    }

    /// Distance from the root (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children(&self) -> &[Sphere<L>] {
        &self.children
    }

    pub fn discriminant(&self) -> Option<&Discriminant<L>> {
        self.discriminant.as_ref()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Attach `child`, fixing up the depth of its whole subtree.
    pub fn add_child(&mut self, mut child: Sphere<L>) {
        child.set_depth(self.depth + 1);
        self.children.push(child);
    }

    fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.set_depth(depth + 1);
        }
    }

    /// Whether `point` lies inside or on the sphere.
    pub fn encloses<D: Distance + ?Sized>(&self, point: &Vector, measure: &D) -> Result<bool> {
        Ok(measure.distance(&self.center.vector, point)? <= self.radius)
    }

    #[inline]
    pub(crate) fn encloses_unchecked<D: Distance + ?Sized>(&self, point: &[f64], measure: &D) -> bool {
        measure.distance_unchecked(self.center.features(), point) <= self.radius
    }

    /// Members of `vectors` inside or on the sphere, in input order.
    pub fn enclosed<'a, D: Distance + ?Sized>(
        &self,
        vectors: &'a [LabeledVector<L>],
        measure: &D,
    ) -> Result<Vec<&'a LabeledVector<L>>> {
        self.check_ranks(vectors)?;
        Ok(vectors
            .iter()
            .filter(|v| self.encloses_unchecked(v.features(), measure))
            .collect())
    }

    pub(crate) fn check_ranks(&self, vectors: &[LabeledVector<L>]) -> Result<()> {
        vectors
            .iter()
            .try_for_each(|v| self.center.vector.check_rank(&v.vector))
    }

    // ── tree navigation ──────────────────────────────────────────────

    /// Node at `path` below this one.
    pub fn node(&self, path: &[usize]) -> Option<&Sphere<L>> {
        path.iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    /// Chain from the node at `path` up to (and including) this one,
    /// nearest first.
    pub fn ancestors(&self, path: &[usize]) -> Option<Vec<&Sphere<L>>> {
        let mut chain = Vec::with_capacity(path.len() + 1);
        let mut node = self;
        chain.push(node);
        for &i in path {
            node = node.children.get(i)?;
            chain.push(node);
        }
        chain.reverse();
        Some(chain)
    }

    // ── whole-tree statistics ────────────────────────────────────────

    /// Number of spheres in the tree, this one included.
    pub fn sphere_count(&self) -> usize {
        1 + self.children.iter().map(Sphere::sphere_count).sum::<usize>()
    }

    /// Levels in the tree; a leaf has height 1.
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(Sphere::height).max().unwrap_or(0)
    }

    /// Nodes carrying a discriminant.
    pub fn discriminant_count(&self) -> usize {
        usize::from(self.discriminant.is_some())
            + self
                .children
                .iter()
                .map(Sphere::discriminant_count)
                .sum::<usize>()
    }

    // ── hierarchy dump ───────────────────────────────────────────────

    /// Indented dump, one node per line: `[f0, f1, …] - radius - label`.
    pub fn write_hierarchy<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_node(out, &|_: &Sphere<L>| None)
    }

    /// As [`write_hierarchy`](Self::write_hierarchy), with ` ::: n` appended
    /// where `n` counts the members of `vectors` each node encloses.
    pub fn write_hierarchy_with_counts<W: io::Write, D: Distance + ?Sized>(
        &self,
        out: &mut W,
        vectors: &[LabeledVector<L>],
        measure: &D,
    ) -> io::Result<()> {
        self.write_node(out, &|node: &Sphere<L>| {
            Some(
                vectors
                    .iter()
                    .filter(|v| {
                        v.rank() == node.rank() && node.encloses_unchecked(v.features(), measure)
                    })
                    .count(),
            )
        })
    }

    fn write_node<W: io::Write>(
        &self,
        out: &mut W,
        count: &dyn Fn(&Sphere<L>) -> Option<usize>,
    ) -> io::Result<()> {
        let mut line = "  ".repeat(self.depth);
        line.push('[');
        for (i, x) in self.center.features().iter().enumerate() {
            if i > 0 {
                line.push_str(", ");
            }
            let _ = write!(line, "{x}");
        }
        let _ = write!(line, "] - {} - {:?}", self.radius, self.center.label);
        if let Some(d) = &self.discriminant {
            let _ = write!(line, " | lda {:?}/{:?}", d.left_label(), d.right_label());
        }
        if let Some(n) = count(self) {
            let _ = write!(line, " ::: {n}");
        }
        writeln!(out, "{line}")?;

        for child in &self.children {
            child.write_node(out, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhc_core::{Euclidean, SquaredEuclidean};

    fn lv(label: &'static str, features: &[f64]) -> LabeledVector<&'static str> {
        LabeledVector::new(label, features.to_vec())
    }

    #[test]
    fn test_unit_sphere() {
        let root = Sphere::unit(&SquaredEuclidean, 2, "A");
        assert_eq!(root.center().features(), &[0.5, 0.5]);
        assert_eq!(root.radius(), 0.5);
        assert_eq!(root.label(), &"A");
        assert_eq!(root.depth(), 0);

        let corner = Vector::new(vec![0.0, 1.0]);
        assert!(root.encloses(&corner, &SquaredEuclidean).unwrap());
        assert!(!root
            .encloses(&Vector::new(vec![1.0, 1.1]), &SquaredEuclidean)
            .unwrap());
    }

    #[test]
    fn test_bounding_sphere() {
        let vectors = vec![lv("A", &[0.0, 0.0]), lv("B", &[2.0, 0.0]), lv("A", &[1.0, 3.0])];
        let root = Sphere::bounding(&vectors, &Euclidean, "A").unwrap();
        assert_eq!(root.center().features(), &[1.0, 1.0]);
        assert_eq!(root.enclosed(&vectors, &Euclidean).unwrap().len(), 3);

        let empty: Vec<LabeledVector<&str>> = Vec::new();
        assert!(matches!(
            Sphere::bounding(&empty, &Euclidean, "A"),
            Err(RhcError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_encloses_rank_mismatch() {
        let root = Sphere::unit(&Euclidean, 2, "A");
        assert_eq!(
            root.encloses(&Vector::new(vec![0.5]), &Euclidean),
            Err(RhcError::RankMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_add_child_sets_depth() {
        let mut grandchild_parent = Sphere::new(lv("B", &[0.2, 0.2]), 0.1);
        grandchild_parent.add_child(Sphere::new(lv("A", &[0.2, 0.25]), 0.01));
        assert_eq!(grandchild_parent.children()[0].depth(), 1);

        let mut root = Sphere::unit(&Euclidean, 2, "A");
        root.add_child(grandchild_parent);
        assert_eq!(root.children()[0].depth(), 1);
        assert_eq!(root.children()[0].children()[0].depth(), 2);
    }

    #[test]
    fn test_counts_and_navigation() {
        let mut root = Sphere::unit(&Euclidean, 2, "A");
        assert_eq!(root.sphere_count(), 1);
        assert_eq!(root.height(), 1);

        let mut b = Sphere::new(lv("B", &[0.75, 0.75]), 0.2);
        b.add_child(Sphere::new(lv("A", &[0.8, 0.8]), 0.05));
        root.add_child(b);
        root.add_child(Sphere::new(lv("C", &[0.2, 0.2]), 0.1));

        assert_eq!(root.sphere_count(), 4);
        assert_eq!(root.height(), 3);
        assert_eq!(root.discriminant_count(), 0);

        let leaf = root.node(&[0, 0]).unwrap();
        assert_eq!(leaf.center().features(), &[0.8, 0.8]);
        assert!(root.node(&[2]).is_none());

        let chain = root.ancestors(&[0, 0]).unwrap();
        let labels: Vec<&str> = chain.iter().map(|s| *s.label()).collect();
        assert_eq!(labels, vec!["A", "B", "A"]);
        assert_eq!(chain.last().unwrap().depth(), 0);
    }

    #[test]
    fn test_write_hierarchy() {
        let mut root = Sphere::unit(&SquaredEuclidean, 2, "A");
        root.add_child(Sphere::new(lv("B", &[0.5, 1.0]), 0.25));

        let mut plain = Vec::new();
        root.write_hierarchy(&mut plain).unwrap();
        let text = String::from_utf8(plain).unwrap();
        assert_eq!(text, "[0.5, 0.5] - 0.5 - \"A\"\n  [0.5, 1] - 0.25 - \"B\"\n");

        let vectors = vec![lv("A", &[0.0, 0.0]), lv("B", &[0.0, 1.0]), lv("B", &[1.0, 1.0])];
        let mut counted = Vec::new();
        root.write_hierarchy_with_counts(&mut counted, &vectors, &SquaredEuclidean)
            .unwrap();
        let text = String::from_utf8(counted).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("::: 3"));
        assert!(lines[1].ends_with("::: 2"));
    }
}
