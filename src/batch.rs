use crate::PdError;
use std::ops::Range;

/// Contiguous job range owned by `task_id`. Ranges of distinct task ids never
/// overlap; a task past the end of the job space gets an empty range.
pub fn plan(task_id: u64, batch_size: u64, total_jobs: u64) -> Result<Range<u64>, PdError> {
    if batch_size == 0 {
        return Err(PdError::config("batch size must be positive"));
    }
    let start = task_id.saturating_mul(batch_size);
    if start >= total_jobs {
        return Ok(total_jobs..total_jobs);
    }
    let end = start.saturating_add(batch_size).min(total_jobs);
    Ok(start..end)
}

/// Number of task ids needed to cover every job.
pub fn task_count(batch_size: u64, total_jobs: u64) -> Result<u64, PdError> {
    if batch_size == 0 {
        return Err(PdError::config("batch size must be positive"));
    }
    Ok(total_jobs.div_ceil(batch_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_partial_batch() {
        assert_eq!(plan(2, 10, 25).unwrap(), 20..25);
    }

    #[test]
    fn test_task_past_the_end_is_empty() {
        assert!(plan(3, 10, 25).unwrap().is_empty());
        assert!(plan(u64::MAX, 10, 25).unwrap().is_empty());
    }

    #[test]
    fn test_ranges_partition_the_job_space() {
        let total = 97;
        for batch_size in 1..20 {
            let tasks = task_count(batch_size, total).unwrap();
            let mut covered = 0;
            for task_id in 0..tasks {
                let range = plan(task_id, batch_size, total).unwrap();
                assert_eq!(range.start, covered);
                assert!(!range.is_empty());
                covered = range.end;
            }
            assert_eq!(covered, total);
            assert!(plan(tasks, batch_size, total).unwrap().is_empty());
        }
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(plan(0, 0, 10), Err(PdError::Configuration(_))));
        assert!(matches!(task_count(0, 10), Err(PdError::Configuration(_))));
    }
}
