use crate::parameters::{DistanceKind, ParameterTuple};
use serde::{Deserialize, Serialize};

/// Output of one job. Field names on disk match the batch artifacts the
/// pipeline has always produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub experiment_name: String,
    #[serde(rename = "words")]
    pub word_count: u64,
    pub embedding_dimension: u32,
    pub job_id: u64,
    pub metric: String,
    #[serde(rename = "persistent_diagram_dim")]
    pub dimension: u32,
    #[serde(rename = "pd_metric")]
    pub distance_kind: DistanceKind,
    /// The unordered pair, stored sorted.
    pub languages: [String; 2],
    pub value: f64,
}

impl ResultRecord {
    pub fn parameter_tuple(&self) -> ParameterTuple {
        ParameterTuple::new(self.metric.clone(), self.dimension, self.distance_kind)
    }

    /// Checks the invariants a record must satisfy to be merged.
    pub fn validate(&self) -> Result<(), String> {
        if self.languages[0] == self.languages[1] {
            return Err(format!(
                "job {} pairs language '{}' with itself",
                self.job_id, self.languages[0]
            ));
        }
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(format!("job {} has invalid value {}", self.job_id, self.value));
        }
        Ok(())
    }
}
