use crate::distance;
use crate::job_index::JobIndexer;
use crate::languages::LanguageSet;
use crate::parameters::{DistanceKind, ParameterSpace};
use crate::PdError;

pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 300;
pub const DEFAULT_BATCH_SIZE: u64 = 100;

/// Everything that identifies a run. Workers and the merge must be given the
/// same configuration for job ids to mean the same thing.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub experiment_name: String,
    pub word_count: u64,
    pub embedding_dimension: u32,
    pub languages: LanguageSet,
    pub parameters: ParameterSpace,
}

impl RunConfig {
    pub fn new(
        experiment_name: impl Into<String>,
        word_count: u64,
        languages: &[String],
        metrics: &[String],
        dimensions: &[u32],
        kinds: &[DistanceKind],
    ) -> Result<Self, PdError> {
        let experiment_name = experiment_name.into();
        if experiment_name.is_empty() || experiment_name.contains(['/', '\\']) {
            return Err(PdError::config(format!("invalid experiment name {:?}", experiment_name)));
        }
        if word_count == 0 {
            return Err(PdError::config("word count must be positive"));
        }
        let bad_metric = metrics.iter().find(|m| m.is_empty() || m.contains(['/', '\\', ' ']));
        if let Some(metric) = bad_metric {
            return Err(PdError::config(format!("invalid metric name {:?}", metric)));
        }
        Ok(Self {
            experiment_name,
            word_count,
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            languages: LanguageSet::new(languages.iter().cloned())?,
            parameters: ParameterSpace::enumerate(metrics, dimensions, kinds)?,
        })
    }

    pub fn with_embedding_dimension(mut self, embedding_dimension: u32) -> Self {
        self.embedding_dimension = embedding_dimension;
        self
    }

    pub fn job_indexer(&self) -> Result<JobIndexer, PdError> {
        JobIndexer::new(self.parameters.len(), self.languages.len())
    }

    /// Fails on any tuple the built-in distance oracle cannot compute.
    pub fn check_computable(&self) -> Result<(), PdError> {
        self.parameters.iter().try_for_each(distance::check_supported)
    }
}
