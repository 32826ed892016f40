//! Spawn configuration.

use std::str::FromStr;

use rhc_core::RhcError;

/// How a new child is sized (and, for `Exploding`, corrected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnRule {
    /// Centered on the group centroid, radius `R − d(parent, centroid)`.
    #[default]
    Centroid,
    /// As `Centroid`, but a centroid closer than `2/5·R` to the parent center
    /// gets radius `1.5·d` instead.
    Minimal,
    /// Radius is half the distance from the centroid to the nearest vector
    /// of any other label in the whole training pool.
    DifferentLabel,
    /// Radius reaches the closest existing child center (or `R − d` when the
    /// parent center is closest); degenerate candidates are re-centered on
    /// the furthest group member with half the gap to its nearest neighbour.
    Exploding,
}

/// Which group member a child is re-centered on when the centroid sphere
/// encloses none of its own group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionStrategy {
    /// Member closest to the parent center.
    #[default]
    Closest,
    /// Member furthest from the parent center.
    Furthest,
    /// Uniformly random member, drawn from the generator passed to spawn.
    Random,
}

/// When a node may be collapsed into a Fisher discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LdaPolicy {
    /// Only nodes that have no children yet.
    #[default]
    WhenChildless,
    /// Any node whose uncovered vectors fall into exactly two classes.
    Always,
}

/// Whether the per-child recursion of a spawn pass fans out onto threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    #[default]
    Sequential,
    /// Children of the called node are grown on scoped threads; deeper
    /// levels run sequentially inside each thread.
    Parallel,
}

/// Options for one spawn pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnOptions {
    pub rule: SpawnRule,
    pub collision: CollisionStrategy,
    pub concurrency: Concurrency,
    /// `Some` enables discriminant attachment.
    pub lda: Option<LdaPolicy>,
}

impl SpawnOptions {
    pub fn with_rule(mut self, rule: SpawnRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_collision(mut self, collision: CollisionStrategy) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_lda(mut self, policy: LdaPolicy) -> Self {
        self.lda = Some(policy);
        self
    }
}

fn normalized(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}

impl FromStr for SpawnRule {
    type Err = RhcError;

    fn from_str(s: &str) -> Result<Self, RhcError> {
        match normalized(s).as_str() {
            "centroid" | "default" => Ok(SpawnRule::Centroid),
            "minimal" | "minimally" => Ok(SpawnRule::Minimal),
            "different-label" => Ok(SpawnRule::DifferentLabel),
            "exploding" => Ok(SpawnRule::Exploding),
            _ => Err(RhcError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl FromStr for CollisionStrategy {
    type Err = RhcError;

    fn from_str(s: &str) -> Result<Self, RhcError> {
        match normalized(s).as_str() {
            "closest" => Ok(CollisionStrategy::Closest),
            "furthest" => Ok(CollisionStrategy::Furthest),
            "random" => Ok(CollisionStrategy::Random),
            _ => Err(RhcError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl FromStr for LdaPolicy {
    type Err = RhcError;

    fn from_str(s: &str) -> Result<Self, RhcError> {
        match normalized(s).as_str() {
            "childless" | "when-childless" => Ok(LdaPolicy::WhenChildless),
            "always" => Ok(LdaPolicy::Always),
            _ => Err(RhcError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl FromStr for Concurrency {
    type Err = RhcError;

    fn from_str(s: &str) -> Result<Self, RhcError> {
        match normalized(s).as_str() {
            "sequential" | "single" => Ok(Concurrency::Sequential),
            "parallel" => Ok(Concurrency::Parallel),
            _ => Err(RhcError::UnsupportedStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SpawnOptions::default();
        assert_eq!(opts.rule, SpawnRule::Centroid);
        assert_eq!(opts.collision, CollisionStrategy::Closest);
        assert_eq!(opts.concurrency, Concurrency::Sequential);
        assert_eq!(opts.lda, None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Different_Label".parse::<SpawnRule>().unwrap(), SpawnRule::DifferentLabel);
        assert_eq!("random".parse::<CollisionStrategy>().unwrap(), CollisionStrategy::Random);
        assert_eq!("always".parse::<LdaPolicy>().unwrap(), LdaPolicy::Always);
        assert_eq!("parallel".parse::<Concurrency>().unwrap(), Concurrency::Parallel);
    }

    #[test]
    fn test_unknown_strategy() {
        assert_eq!(
            "nearest-ish".parse::<CollisionStrategy>(),
            Err(RhcError::UnsupportedStrategy("nearest-ish".into()))
        );
        assert!("sometimes".parse::<LdaPolicy>().is_err());
    }
}
