use crate::batch;
use crate::config::RunConfig;
use crate::diagram::DiagramSource;
use crate::distance::DistanceOracle;
use crate::record::ResultRecord;
use crate::result_store::ResultStore;
use crate::PdError;
use std::ops::Range;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, info_span};

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub task_id: u64,
    pub jobs: Range<u64>,
    pub records: usize,
    /// `None` when the task had no jobs and nothing was written.
    pub artifact: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Computes every job of `task_id` and persists them as one batch. The
/// artifact is written only after the last job finished, so an interrupted
/// worker leaves nothing behind and can simply be re-run.
pub fn run_batch<S, O>(
    config: &RunConfig,
    task_id: u64,
    batch_size: u64,
    source: &mut S,
    oracle: &O,
    store: &ResultStore,
) -> Result<BatchReport, PdError>
where
    S: DiagramSource + ?Sized,
    O: DistanceOracle + ?Sized,
{
    let started = Instant::now();
    let indexer = config.job_indexer()?;
    let jobs = batch::plan(task_id, batch_size, indexer.total_jobs())?;
    let _span = info_span!("batch", experiment = %config.experiment_name, task_id).entered();
    info!(
        words = config.word_count,
        languages = config.languages.len(),
        start = jobs.start,
        end = jobs.end,
        total = indexer.total_jobs(),
        "starting batch"
    );

    if jobs.is_empty() {
        info!("task id past the end of the job space, nothing to do");
        return Ok(BatchReport {
            task_id,
            jobs,
            records: 0,
            artifact: None,
            elapsed: started.elapsed(),
        });
    }

    let mut records = Vec::with_capacity((jobs.end - jobs.start) as usize);
    for job_id in jobs.clone() {
        let components = indexer.job_to_components(job_id)?;
        let tuple = config
            .parameters
            .get(components.parameter_index)
            .ok_or_else(|| {
                PdError::config(format!("no parameter tuple at {}", components.parameter_index))
            })?;
        let label = |position: usize| {
            config
                .languages
                .label(position)
                .map(str::to_string)
                .ok_or_else(|| PdError::config(format!("no language at position {}", position)))
        };
        let (first, second) = (label(components.i)?, label(components.j)?);

        let job_started = Instant::now();
        let a = source.diagram(&first, &tuple.metric, tuple.dimension)?;
        let b = source.diagram(&second, &tuple.metric, tuple.dimension)?;
        let value = oracle.distance(&a, &b, tuple)?;
        let pair = format!("{} vs {}", first, second);
        info!(
            job_id,
            parameters = %tuple,
            pair = %pair,
            value,
            seconds = job_started.elapsed().as_secs_f64(),
            "job done"
        );

        let mut languages = [first, second];
        languages.sort();
        records.push(ResultRecord {
            experiment_name: config.experiment_name.clone(),
            word_count: config.word_count,
            embedding_dimension: config.embedding_dimension,
            job_id,
            metric: tuple.metric.clone(),
            dimension: tuple.dimension,
            distance_kind: tuple.distance_kind,
            languages,
            value,
        });
    }

    let path = store.write_batch(task_id, &records)?;
    let elapsed = started.elapsed();
    info!(
        records = records.len(),
        seconds = elapsed.as_secs_f64(),
        path = %path.display(),
        "distances saved"
    );
    Ok(BatchReport {
        task_id,
        jobs,
        records: records.len(),
        artifact: Some(path),
        elapsed,
    })
}
