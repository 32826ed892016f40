//! Radial ordering of vectors around a focus point.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::distance::Distance;
use crate::error::RhcError;
use crate::vector::Vector;

/// Direction of a radial sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    ShortestDistanceFirst,
    GreatestDistanceFirst,
}

impl FromStr for SortOrder {
    type Err = RhcError;

    fn from_str(s: &str) -> Result<Self, RhcError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortest" | "ascending" => Ok(SortOrder::ShortestDistanceFirst),
            "greatest" | "descending" => Ok(SortOrder::GreatestDistanceFirst),
            _ => Err(RhcError::UnsupportedStrategy(s.to_string())),
        }
    }
}

/// Sort `vectors` by distance from `focus`. The sort is stable: vectors at
/// equal distance keep their input order.
///
/// Ranks are not checked here; the slice kernel zips features, so callers
/// validate ranks up front.
pub fn radial_sort<'a, V, D>(
    vectors: impl IntoIterator<Item = &'a V>,
    focus: &Vector,
    measure: &D,
    order: SortOrder,
) -> Vec<&'a V>
where
    V: AsRef<Vector> + ?Sized + 'a,
    D: Distance + ?Sized,
{
    let mut keyed: Vec<(f64, &'a V)> = vectors
        .into_iter()
        .map(|v| {
            (
                measure.distance_unchecked(focus.features(), v.as_ref().features()),
                v,
            )
        })
        .collect();

    match order {
        SortOrder::ShortestDistanceFirst => keyed.sort_by(|a, b| a.0.total_cmp(&b.0)),
        SortOrder::GreatestDistanceFirst => keyed.sort_by(|a, b| b.0.total_cmp(&a.0)),
    }
    keyed.into_iter().map(|(_, v)| v).collect()
}

/// Member of `vectors` closest to `focus`; the first one wins ties.
pub fn closest<'a, V, D>(
    vectors: impl IntoIterator<Item = &'a V>,
    focus: &Vector,
    measure: &D,
) -> Option<(&'a V, f64)>
where
    V: AsRef<Vector> + ?Sized + 'a,
    D: Distance + ?Sized,
{
    extreme(vectors, focus, measure, Ordering::Less)
}

/// Member of `vectors` furthest from `focus`; the first one wins ties.
pub fn furthest<'a, V, D>(
    vectors: impl IntoIterator<Item = &'a V>,
    focus: &Vector,
    measure: &D,
) -> Option<(&'a V, f64)>
where
    V: AsRef<Vector> + ?Sized + 'a,
    D: Distance + ?Sized,
{
    extreme(vectors, focus, measure, Ordering::Greater)
}

fn extreme<'a, V, D>(
    vectors: impl IntoIterator<Item = &'a V>,
    focus: &Vector,
    measure: &D,
    wanted: Ordering,
) -> Option<(&'a V, f64)>
where
    V: AsRef<Vector> + ?Sized + 'a,
    D: Distance + ?Sized,
{
    let mut best: Option<(&'a V, f64)> = None;
    for v in vectors {
        let d = measure.distance_unchecked(focus.features(), v.as_ref().features());
        match best {
            Some((_, best_d)) if d.total_cmp(&best_d) != wanted => {}
            _ => best = Some((v, d)),
        }
    }
    best
}
