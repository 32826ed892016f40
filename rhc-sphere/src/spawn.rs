//! Spawning: one pass of tree growth.
//!
//! ```text
//! grow(node, candidates):
//!   1. enclosed  ← candidates inside node           (none → done)
//!   2. grow every child on `enclosed`
//!   3. uncovered ← enclosed outside every child
//!   4. two uncovered classes and LDA enabled → try a discriminant
//!   5. per uncovered label ≠ node label → propose a child
//!   6. attach proposals whose center differs from the node center
//! ```
//!
//! A node holding a discriminant is terminal and spawns nothing. The
//! return value of every entry point is the number of spheres created, so
//! training repeats passes until a pass returns 0.
//!
//! Ranks are validated once on entry; the recursion uses the unchecked
//! distance kernel.

use std::collections::BTreeMap;

use rand::Rng;
use rhc_core::{
    centroid, closest, fan_out_mut, furthest, group_by_label, Distance, Label, LabeledVector,
    Result, RhcError, SplitMix64,
};
use tracing::{debug, trace};

use crate::discriminant::is_completely_separated_with_discriminant;
use crate::options::{CollisionStrategy, Concurrency, LdaPolicy, SpawnOptions, SpawnRule};
use crate::sphere::Sphere;

type Groups<'a, L> = BTreeMap<L, Vec<&'a LabeledVector<L>>>;

/// State shared read-only by every node visited in one pass.
struct Pass<'p, L, D: ?Sized> {
    /// The full training set, for rules that look beyond the local node.
    pool: &'p [LabeledVector<L>],
    measure: &'p D,
    options: &'p SpawnOptions,
}

impl<L: Label> Sphere<L> {
    /// Run one spawn pass over `vectors` and return the number of spheres
    /// created.
    ///
    /// `rng` is only drawn from by [`CollisionStrategy::Random`]. Each child
    /// recursion gets its own fork of it, so a given seed grows the same
    /// tree under either [`Concurrency`] mode.
    pub fn spawn<D: Distance + ?Sized>(
        &mut self,
        vectors: &[LabeledVector<L>],
        measure: &D,
        options: &SpawnOptions,
        rng: &mut SplitMix64,
    ) -> Result<usize> {
        self.check_ranks(vectors)?;
        let pass = Pass {
            pool: vectors,
            measure,
            options,
        };
        let candidates: Vec<&LabeledVector<L>> = vectors.iter().collect();
        let created = self.grow(&candidates, &pass, options.concurrency, rng)?;
        debug!(
            created,
            spheres = self.sphere_count(),
            rule = ?options.rule,
            "spawn pass"
        );
        Ok(created)
    }

    /// Spawn pass that may collapse two-class nodes into discriminants.
    pub fn spawn_with_lda<D: Distance + ?Sized>(
        &mut self,
        vectors: &[LabeledVector<L>],
        measure: &D,
        policy: LdaPolicy,
    ) -> Result<usize> {
        self.spawn_deterministic(vectors, measure, SpawnOptions::default().with_lda(policy))
    }

    /// Spawn pass with the [`SpawnRule::Minimal`] sizing.
    pub fn spawn_minimally<D: Distance + ?Sized>(
        &mut self,
        vectors: &[LabeledVector<L>],
        measure: &D,
    ) -> Result<usize> {
        self.spawn_deterministic(
            vectors,
            measure,
            SpawnOptions::default().with_rule(SpawnRule::Minimal),
        )
    }

    /// Spawn pass with the [`SpawnRule::DifferentLabel`] sizing.
    pub fn spawn_minimally_using_different_label<D: Distance + ?Sized>(
        &mut self,
        vectors: &[LabeledVector<L>],
        measure: &D,
    ) -> Result<usize> {
        self.spawn_deterministic(
            vectors,
            measure,
            SpawnOptions::default().with_rule(SpawnRule::DifferentLabel),
        )
    }

    /// Spawn pass with the [`SpawnRule::Exploding`] sizing.
    pub fn spawn_by_exploding<D: Distance + ?Sized>(
        &mut self,
        vectors: &[LabeledVector<L>],
        measure: &D,
    ) -> Result<usize> {
        self.spawn_deterministic(
            vectors,
            measure,
            SpawnOptions::default().with_rule(SpawnRule::Exploding),
        )
    }

    fn spawn_deterministic<D: Distance + ?Sized>(
        &mut self,
        vectors: &[LabeledVector<L>],
        measure: &D,
        options: SpawnOptions,
    ) -> Result<usize> {
        // Closest collision never draws from the generator.
        let mut rng = SplitMix64::new(0);
        self.spawn(vectors, measure, &options, &mut rng)
    }

    /// Grow the tree by one vector: a child centered on `vector` is added
    /// at the deepest enclosing node of another label that no child covers.
    pub fn spawn_singular<D: Distance + ?Sized>(
        &mut self,
        vector: &LabeledVector<L>,
        measure: &D,
    ) -> Result<usize> {
        self.center.vector.check_rank(&vector.vector)?;
        Ok(self.grow_singular(vector, measure, false))
    }

    /// As [`spawn_singular`](Self::spawn_singular), sizing the new child to
    /// reach the nearest existing child center when that is closer than the
    /// parent center.
    pub fn spawn_singular_by_exploding<D: Distance + ?Sized>(
        &mut self,
        vector: &LabeledVector<L>,
        measure: &D,
    ) -> Result<usize> {
        self.center.vector.check_rank(&vector.vector)?;
        Ok(self.grow_singular(vector, measure, true))
    }

    // ─────────────────────────────────────────────────────────────────
    // Recursion
    // ─────────────────────────────────────────────────────────────────

    fn grow<D: Distance + ?Sized>(
        &mut self,
        candidates: &[&LabeledVector<L>],
        pass: &Pass<'_, L, D>,
        concurrency: Concurrency,
        rng: &mut SplitMix64,
    ) -> Result<usize> {
        if self.discriminant.is_some() {
            return Ok(0);
        }

        let measure = pass.measure;
        let enclosed: Vec<&LabeledVector<L>> = candidates
            .iter()
            .copied()
            .filter(|v| self.encloses_unchecked(v.features(), measure))
            .collect();
        if enclosed.is_empty() {
            return Ok(0);
        }

        let forks: Vec<SplitMix64> = self.children.iter().map(|_| rng.fork()).collect();
        let mut created = match concurrency {
            Concurrency::Sequential => {
                let mut n = 0;
                for (child, mut child_rng) in self.children.iter_mut().zip(forks) {
                    n += child.grow(&enclosed, pass, Concurrency::Sequential, &mut child_rng)?;
                }
                n
            }
            Concurrency::Parallel => {
                let enclosed = &enclosed;
                fan_out_mut(&mut self.children, forks, |child, mut child_rng| {
                    child.grow(enclosed, pass, Concurrency::Sequential, &mut child_rng)
                })
                .into_iter()
                .sum::<Result<usize>>()?
            }
        };

        let uncovered: Vec<&LabeledVector<L>> = enclosed
            .iter()
            .copied()
            .filter(|v| {
                !self
                    .children
                    .iter()
                    .any(|c| c.encloses_unchecked(v.features(), measure))
            })
            .collect();
        if uncovered.is_empty() {
            return Ok(created);
        }

        let groups = group_by_label(uncovered.iter().copied());
        if self.try_attach_discriminant(&groups, pass)? {
            return Ok(created);
        }

        let mut proposals = Vec::new();
        for (label, group) in &groups {
            if label == self.label() {
                continue;
            }
            let proposal = match pass.options.rule {
                SpawnRule::Exploding => self.explode(group, &enclosed, measure)?,
                rule => self.propose(label, group, &enclosed, rule, pass, rng)?,
            };
            match proposal {
                Some(child) => proposals.push(child),
                None => trace!(?label, depth = self.depth, "group yields no child"),
            }
        }

        for child in proposals {
            if child.center.vector == self.center.vector {
                trace!(depth = self.depth, "child would share the parent center; rejected");
                continue;
            }
            trace!(
                label = ?child.center.label,
                radius = child.radius,
                depth = self.depth + 1,
                "child attached"
            );
            self.add_child(child);
            created += 1;
        }
        Ok(created)
    }

    fn try_attach_discriminant<D: Distance + ?Sized>(
        &mut self,
        groups: &Groups<'_, L>,
        pass: &Pass<'_, L, D>,
    ) -> Result<bool> {
        let Some(policy) = pass.options.lda else {
            return Ok(false);
        };
        if groups.len() != 2 || (policy == LdaPolicy::WhenChildless && !self.children.is_empty()) {
            return Ok(false);
        }

        let mut it = groups.values();
        let (Some(first), Some(second)) = (it.next(), it.next()) else {
            return Ok(false);
        };
        match is_completely_separated_with_discriminant(first, second) {
            Ok(Some(d)) => {
                debug!(
                    depth = self.depth,
                    left = ?d.left_label(),
                    right = ?d.right_label(),
                    "discriminant attached"
                );
                self.discriminant = Some(d);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(RhcError::SingularMatrix { column }) => {
                trace!(column, depth = self.depth, "singular scatter; spawning instead");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Child proposals
    // ─────────────────────────────────────────────────────────────────

    /// Centroid-based proposal with the collision corrections.
    fn propose<D: Distance + ?Sized>(
        &self,
        label: &L,
        group: &[&LabeledVector<L>],
        enclosed: &[&LabeledVector<L>],
        rule: SpawnRule,
        pass: &Pass<'_, L, D>,
        rng: &mut SplitMix64,
    ) -> Result<Option<Sphere<L>>> {
        let measure = pass.measure;
        let r = self.radius;
        let center = centroid(group)?;
        let d = measure.distance_unchecked(self.center.features(), center.features());

        let radius = match rule {
            SpawnRule::Minimal if d < 0.4 * r => 1.5 * d,
            SpawnRule::DifferentLabel => {
                let others = pass.pool.iter().filter(|v| &v.label != label);
                match closest(others, &center, measure) {
                    Some((_, gap)) => gap * 0.5,
                    None => r - d,
                }
            }
            _ => r - d,
        };
        let mut child = Sphere::new(LabeledVector::from_vector(label.clone(), center), radius);

        // Covers none of its own group: re-center on a member.
        if !child.encloses_any(group, measure) {
            let chosen = match pass.options.collision {
                CollisionStrategy::Closest => closest(group.iter().copied(), self.center(), measure),
                CollisionStrategy::Furthest => furthest(group.iter().copied(), self.center(), measure),
                CollisionStrategy::Random => {
                    let v = group[rng.gen_range(0..group.len())];
                    Some((v, measure.distance_unchecked(self.center.features(), v.features())))
                }
            };
            if let Some((v, dv)) = chosen {
                child = Sphere::new(v.clone(), r - dv);
            }
        }

        // Covers everything the parent does: not discriminative.
        if child.encloses_all(enclosed, measure) {
            let Some((far, d_far)) = furthest(group.iter().copied(), self.center(), measure) else {
                return Ok(None);
            };
            child = Sphere::new(far.clone(), r - d_far);
            if child.encloses_all(enclosed, measure) {
                return Ok(Self::midpoint_child(far, enclosed, measure));
            }
        }
        Ok(Some(child))
    }

    /// Proposal for [`SpawnRule::Exploding`].
    fn explode<D: Distance + ?Sized>(
        &self,
        group: &[&LabeledVector<L>],
        enclosed: &[&LabeledVector<L>],
        measure: &D,
    ) -> Result<Option<Sphere<L>>> {
        let center = centroid(group)?;
        let radius = self.exploding_radius(center.features(), measure);
        let child = Sphere::new(
            LabeledVector::from_vector(group[0].label.clone(), center),
            radius,
        );

        if child.encloses_all(enclosed, measure) || !child.encloses_any(group, measure) {
            return Ok(
                furthest(group.iter().copied(), self.center(), measure)
                    .and_then(|(far, _)| Self::half_gap_child(far, enclosed, measure)),
            );
        }
        Ok(Some(child))
    }

    /// Distance from `point` to the nearest child center, or `R − d` when
    /// this node's own center is at least as close.
    fn exploding_radius<D: Distance + ?Sized>(&self, point: &[f64], measure: &D) -> f64 {
        let mut nearest = measure.distance_unchecked(self.center.features(), point);
        let mut radius = self.radius - nearest;
        for child in &self.children {
            let d = measure.distance_unchecked(child.center.features(), point);
            if d < nearest {
                nearest = d;
                radius = d;
            }
        }
        radius
    }

    /// Sphere on `anchor` whose radius is the midpoint between the nearest
    /// same-label vector and the nearest conflicting vector in `enclosed`.
    ///
    /// `None` when a conflicting vector sits on the anchor or when `enclosed`
    /// offers no other position at all.
    fn midpoint_child<D: Distance + ?Sized>(
        anchor: &LabeledVector<L>,
        enclosed: &[&LabeledVector<L>],
        measure: &D,
    ) -> Option<Sphere<L>> {
        let mut nearest_same: Option<f64> = None;
        let mut nearest_conflict: Option<f64> = None;
        for v in enclosed {
            let same_label = v.label == anchor.label;
            if same_label && v.vector == anchor.vector {
                continue;
            }
            let d = measure.distance_unchecked(anchor.features(), v.features());
            let slot = if same_label {
                &mut nearest_same
            } else {
                &mut nearest_conflict
            };
            if slot.map_or(true, |best| d < best) {
                *slot = Some(d);
            }
        }

        let conflict = match nearest_conflict {
            Some(c) if c == 0.0 => return None,
            Some(c) => c,
            None => return Self::half_gap_child(anchor, enclosed, measure),
        };
        let mut child = Sphere::new(
            anchor.clone(),
            (nearest_same.unwrap_or(0.0) + conflict) * 0.5,
        );
        if child.encloses_all(enclosed, measure) {
            child.radius = conflict * 0.5;
        }
        Some(child)
    }

    /// Sphere on `anchor` reaching halfway to the closest member of
    /// `enclosed` at a different position.
    fn half_gap_child<D: Distance + ?Sized>(
        anchor: &LabeledVector<L>,
        enclosed: &[&LabeledVector<L>],
        measure: &D,
    ) -> Option<Sphere<L>> {
        let gap = enclosed
            .iter()
            .filter(|v| v.vector != anchor.vector)
            .map(|v| measure.distance_unchecked(anchor.features(), v.features()))
            .reduce(f64::min)?;
        Some(Sphere::new(anchor.clone(), gap * 0.5))
    }

    fn encloses_any<D: Distance + ?Sized>(&self, vectors: &[&LabeledVector<L>], measure: &D) -> bool {
        vectors
            .iter()
            .any(|v| self.encloses_unchecked(v.features(), measure))
    }

    fn encloses_all<D: Distance + ?Sized>(&self, vectors: &[&LabeledVector<L>], measure: &D) -> bool {
        vectors
            .iter()
            .all(|v| self.encloses_unchecked(v.features(), measure))
    }

    fn grow_singular<D: Distance + ?Sized>(
        &mut self,
        vector: &LabeledVector<L>,
        measure: &D,
        exploding: bool,
    ) -> usize {
        if self.discriminant.is_some() || !self.encloses_unchecked(vector.features(), measure) {
            return 0;
        }

        let mut created = 0;
        for child in &mut self.children {
            created += child.grow_singular(vector, measure, exploding);
        }

        let covered = self
            .children
            .iter()
            .any(|c| c.encloses_unchecked(vector.features(), measure));
        if covered || vector.label == self.center.label || vector.vector == self.center.vector {
            return created;
        }

        let radius = if exploding {
            self.exploding_radius(vector.features(), measure)
        } else {
            self.radius - measure.distance_unchecked(self.center.features(), vector.features())
        };
        self.add_child(Sphere::new(vector.clone(), radius));
        created + 1
    }
}
