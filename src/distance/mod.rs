pub mod bottleneck;
pub mod sliced_wasserstein;
pub mod vectorise;

use crate::diagram::PersistenceDiagram;
use crate::parameters::{DistanceKind, ParameterTuple};
use crate::PdError;
use vectorise::ImageResolution;

/// Distance between two diagrams for one parameter tuple. Implementations
/// must be deterministic: re-running a job has to reproduce its value.
pub trait DistanceOracle {
    fn distance(
        &self,
        a: &PersistenceDiagram,
        b: &PersistenceDiagram,
        tuple: &ParameterTuple,
    ) -> Result<f64, PdError>;
}

/// The four distance kinds computed in-process.
#[derive(Debug, Clone, Copy)]
pub struct TopologicalDistance {
    pub sliced_directions: usize,
}

impl Default for TopologicalDistance {
    fn default() -> Self {
        Self {
            sliced_directions: sliced_wasserstein::DIRECTIONS,
        }
    }
}

/// Rejects tuples the oracle cannot compute, before any work is scheduled.
pub fn check_supported(tuple: &ParameterTuple) -> Result<(), PdError> {
    if tuple.distance_kind == DistanceKind::PersistenceImage
        && ImageResolution::for_parameters(&tuple.metric, tuple.dimension).is_none()
    {
        return Err(PdError::config(format!(
            "no persistence image resolution for metric '{}'",
            tuple.metric
        )));
    }
    Ok(())
}

fn euclidean_norm_of_difference(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt()
}

impl DistanceOracle for TopologicalDistance {
    fn distance(
        &self,
        a: &PersistenceDiagram,
        b: &PersistenceDiagram,
        tuple: &ParameterTuple,
    ) -> Result<f64, PdError> {
        let value = match tuple.distance_kind {
            DistanceKind::Bottleneck => bottleneck::bottleneck(a, b),
            DistanceKind::SlicedWasserstein => {
                sliced_wasserstein::sliced_wasserstein(a, b, self.sliced_directions)
            }
            DistanceKind::PersistenceImage => {
                let resolution = ImageResolution::for_parameters(&tuple.metric, tuple.dimension)
                    .ok_or_else(|| {
                        PdError::config(format!("no persistence image resolution for {}", tuple))
                    })?;
                euclidean_norm_of_difference(
                    &vectorise::persistence_image(a, &resolution),
                    &vectorise::persistence_image(b, &resolution),
                )
            }
            DistanceKind::BarsStatistics => {
                let only_death = tuple.dimension == 0;
                euclidean_norm_of_difference(
                    &vectorise::bars_statistics(a, only_death),
                    &vectorise::bars_statistics(b, only_death),
                )
            }
        };
        Ok(value)
    }
}
