use crate::{PdError, pair_index};

/// Decoded form of a job id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobComponents {
    pub parameter_index: usize,
    pub pair_index: u64,
    /// Larger language position of the pair.
    pub i: usize,
    /// Smaller language position of the pair.
    pub j: usize,
}

/// Maps job ids onto (parameter tuple, language pair). The parameter index
/// varies fastest, so consecutive job ids walk through every parameter tuple
/// for one pair before moving on to the next pair.
#[derive(Debug, Clone, Copy)]
pub struct JobIndexer {
    param_count: usize,
    language_count: usize,
    total: u64,
}

impl JobIndexer {
    pub fn new(param_count: usize, language_count: usize) -> Result<Self, PdError> {
        if param_count == 0 {
            return Err(PdError::config("parameter space is empty"));
        }
        if language_count < 2 {
            return Err(PdError::config(format!(
                "need at least 2 languages, got {}",
                language_count
            )));
        }
        let total = (param_count as u64)
            .checked_mul(pair_index::pair_count(language_count))
            .ok_or_else(|| PdError::config("job space overflows u64"))?;
        Ok(Self {
            param_count,
            language_count,
            total,
        })
    }

    pub fn total_jobs(&self) -> u64 {
        self.total
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn language_count(&self) -> usize {
        self.language_count
    }

    pub fn job_to_components(&self, job_id: u64) -> Result<JobComponents, PdError> {
        if job_id >= self.total {
            return Err(PdError::config(format!(
                "job id {} out of range (total jobs {})",
                job_id, self.total
            )));
        }
        let p = self.param_count as u64;
        let parameter_index = (job_id % p) as usize;
        let pair_index = job_id / p;
        let (i, j) = pair_index::decode(pair_index, self.language_count)?;
        Ok(JobComponents {
            parameter_index,
            pair_index,
            i,
            j,
        })
    }

    pub fn components_to_job(
        &self,
        parameter_index: usize,
        i: usize,
        j: usize,
    ) -> Result<u64, PdError> {
        if parameter_index >= self.param_count {
            return Err(PdError::config(format!(
                "parameter index {} out of range ({} tuples)",
                parameter_index, self.param_count
            )));
        }
        if i >= self.language_count {
            return Err(PdError::config(format!(
                "language position {} out of range ({} languages)",
                i, self.language_count
            )));
        }
        let pair_index = pair_index::encode(i, j)?;
        Ok(pair_index * self.param_count as u64 + parameter_index as u64)
    }
}
