//! Pluggable distance measures.
//!
//! A [`Distance`] maps a pair of equal-rank vectors to a non-negative real.
//! The checked entry point [`Distance::distance`] rejects rank mismatches;
//! callers that have already validated ranks (the spawn engine does so once
//! per pass) use [`Distance::distance_unchecked`] on raw feature slices.
//!
//! Any `Fn(&[f64], &[f64]) -> f64 + Send + Sync` closure is a measure too,
//! so ad-hoc metrics need no wrapper type.

use crate::error::{Result, RhcError};
use crate::vector::Vector;

/// Distance function over feature vectors. Must be non-negative and
/// return zero for identical inputs.
pub trait Distance: Send + Sync {
    /// Distance between two feature slices of equal length.
    fn distance_unchecked(&self, a: &[f64], b: &[f64]) -> f64;

    /// Distance between two vectors; fails with RankMismatch on differing
    /// ranks.
    #[inline]
    fn distance(&self, a: &Vector, b: &Vector) -> Result<f64> {
        a.check_rank(b)?;
        Ok(self.distance_unchecked(a.features(), b.features()))
    }
}

impl<F> Distance for F
where
    F: Fn(&[f64], &[f64]) -> f64 + Send + Sync,
{
    #[inline]
    fn distance_unchecked(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// Sum of squared differences. Skips the square root, so it orders pairs
/// exactly like [`Euclidean`] at lower cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl Distance for SquaredEuclidean {
    #[inline]
    fn distance_unchecked(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }
}

/// L2 distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Distance for Euclidean {
    #[inline]
    fn distance_unchecked(&self, a: &[f64], b: &[f64]) -> f64 {
        SquaredEuclidean.distance_unchecked(a, b).sqrt()
    }
}

/// Minkowski distance of order `p`: `(Σ |aᵢ − bᵢ|ᵖ)^(1/p)`.
#[derive(Debug, Clone, Copy)]
pub struct Minkowski {
    order: f64,
}

impl Minkowski {
    /// Fails with InvalidParameter unless `order` is finite and `> 0`.
    pub fn new(order: f64) -> Result<Self> {
        if order.is_finite() && order > 0.0 {
            Ok(Self { order })
        } else {
            Err(RhcError::invalid_parameter(format!(
                "minkowski order must be greater than zero, got {order}"
            )))
        }
    }

    pub fn order(&self) -> f64 {
        self.order
    }
}

impl Distance for Minkowski {
    #[inline]
    fn distance_unchecked(&self, a: &[f64], b: &[f64]) -> f64 {
        let sum: f64 = a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs().powf(self.order))
            .sum();
        sum.powf(1.0 / self.order)
    }
}

/// Named measures, for configuration surfaces that pick one by string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Euclidean,
    SquaredEuclidean,
    Minkowski(f64),
}

impl Measure {
    /// Build the boxed measure; fails with InvalidParameter for a bad
    /// Minkowski order.
    pub fn build(self) -> Result<Box<dyn Distance>> {
        Ok(match self {
            Measure::Euclidean => Box::new(Euclidean),
            Measure::SquaredEuclidean => Box::new(SquaredEuclidean),
            Measure::Minkowski(p) => Box::new(Minkowski::new(p)?),
        })
    }
}

impl std::str::FromStr for Measure {
    type Err = RhcError;

    /// Accepts `euclidean`, `squared-euclidean`, or `minkowski:<order>`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "euclidean" => Ok(Measure::Euclidean),
            "squared-euclidean" | "sqeuclidean" => Ok(Measure::SquaredEuclidean),
            other => match other.strip_prefix("minkowski:") {
                Some(order) => order
                    .parse::<f64>()
                    .map(Measure::Minkowski)
                    .map_err(|_| RhcError::invalid_parameter(format!("bad minkowski order: {order}"))),
                None => Err(RhcError::UnsupportedStrategy(s.to_string())),
            },
        }
    }
}
