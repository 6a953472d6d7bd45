use crate::PdError;
use itertools::iproduct;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceKind {
    Bottleneck,
    SlicedWasserstein,
    PersistenceImage,
    BarsStatistics,
}

impl DistanceKind {
    pub const ALL: [DistanceKind; 4] = [
        DistanceKind::Bottleneck,
        DistanceKind::SlicedWasserstein,
        DistanceKind::PersistenceImage,
        DistanceKind::BarsStatistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceKind::Bottleneck => "bottleneck",
            DistanceKind::SlicedWasserstein => "sliced_wasserstein",
            DistanceKind::PersistenceImage => "persistence_image",
            DistanceKind::BarsStatistics => "bars_statistics",
        }
    }
}

impl fmt::Display for DistanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceKind {
    type Err = PdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistanceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PdError::config(format!("unknown distance kind '{}'", s)))
    }
}

/// One target distance matrix: (metric, diagram dimension, distance kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterTuple {
    pub metric: String,
    pub dimension: u32,
    pub distance_kind: DistanceKind,
}

impl ParameterTuple {
    pub fn new(metric: impl Into<String>, dimension: u32, distance_kind: DistanceKind) -> Self {
        Self {
            metric: metric.into(),
            dimension,
            distance_kind,
        }
    }
}

impl fmt::Display for ParameterTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.metric, self.dimension, self.distance_kind)
    }
}

/// Ordered list of parameter tuples. The position of a tuple is its
/// canonical index and is baked into every job id, so the nesting order
/// (metric outer, dimension middle, distance kind inner) must never change.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    tuples: Vec<ParameterTuple>,
    positions: FxHashMap<ParameterTuple, usize>,
}

impl ParameterSpace {
    pub fn enumerate(
        metrics: &[String],
        dimensions: &[u32],
        kinds: &[DistanceKind],
    ) -> Result<Self, PdError> {
        reject_empty_or_duplicated("metrics", metrics)?;
        reject_empty_or_duplicated("dimensions", dimensions)?;
        reject_empty_or_duplicated("distance kinds", kinds)?;

        let tuples: Vec<ParameterTuple> = iproduct!(metrics, dimensions, kinds)
            .map(|(metric, &dimension, &kind)| ParameterTuple::new(metric.clone(), dimension, kind))
            .collect();
        let positions = tuples
            .iter()
            .enumerate()
            .map(|(index, tuple)| (tuple.clone(), index))
            .collect();

        Ok(Self { tuples, positions })
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ParameterTuple> {
        self.tuples.get(index)
    }

    pub fn index_of(&self, tuple: &ParameterTuple) -> Option<usize> {
        self.positions.get(tuple).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterTuple> {
        self.tuples.iter()
    }

    pub fn max_dimension(&self) -> u32 {
        self.tuples.iter().map(|t| t.dimension).max().unwrap_or(0)
    }
}

fn reject_empty_or_duplicated<T>(label: &str, items: &[T]) -> Result<(), PdError>
where
    T: PartialEq + fmt::Debug,
{
    if items.is_empty() {
        return Err(PdError::config(format!("no {} given", label)));
    }
    for (index, item) in items.iter().enumerate() {
        if items[..index].contains(item) {
            return Err(PdError::config(format!("duplicate entry {:?} in {}", item, label)));
        }
    }
    Ok(())
}
