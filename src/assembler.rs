use crate::languages::LanguageSet;
use crate::matrix_file::{self, matrix_file_name};
use crate::parameters::{ParameterSpace, ParameterTuple};
use crate::record::ResultRecord;
use crate::result_store::ResultStore;
use crate::PdError;
use fixedbitset::FixedBitSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What happened when a value was written into a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellFill {
    New,
    /// Same value seen again; nothing changes.
    Repeated,
    /// A different value for an already filled cell. The first value stays.
    Conflict { kept: f64, rejected: f64 },
}

/// `n x n` value grid plus completeness mask. Only the strict lower triangle
/// is required; every other mask bit starts out set.
#[derive(Debug, Clone)]
pub struct AssembledMatrix {
    n: usize,
    values: Vec<f64>,
    mask: FixedBitSet,
    conflicts: usize,
}

impl AssembledMatrix {
    pub fn new(n: usize) -> Self {
        let mut mask = FixedBitSet::with_capacity(n * n);
        for i in 0..n {
            for j in i..n {
                mask.insert(i * n + j);
            }
        }
        Self {
            n,
            values: vec![0.0; n * n],
            mask,
            conflicts: 0,
        }
    }

    pub fn fill(&mut self, i: usize, j: usize, value: f64) -> CellFill {
        debug_assert!(i > j && i < self.n);
        let cell = i * self.n + j;
        if !self.mask.contains(cell) {
            self.mask.insert(cell);
            self.values[cell] = value;
            return CellFill::New;
        }
        let kept = self.values[cell];
        if kept == value {
            CellFill::Repeated
        } else {
            self.conflicts += 1;
            CellFill::Conflict { kept, rejected: value }
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let cell = i * self.n + j;
        (i > j && self.mask.contains(cell)).then(|| self.values[cell])
    }

    pub fn missing_cells(&self) -> usize {
        self.mask.len() - self.mask.count_ones(..)
    }

    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn is_complete(&self) -> bool {
        self.missing_cells() == 0
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatrixOutcome {
    Written { path: PathBuf },
    /// Nothing was written for this tuple.
    Rejected { missing: usize, conflicts: usize },
}

#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    pub artifacts: usize,
    pub records: usize,
    /// Records whose parameter tuple was not requested.
    pub ignored: usize,
    pub outcomes: Vec<(ParameterTuple, MatrixOutcome)>,
}

impl MergeSummary {
    pub fn all_written(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, MatrixOutcome::Written { .. }))
    }

    pub fn outcome(&self, tuple: &ParameterTuple) -> Option<&MatrixOutcome> {
        self.outcomes.iter().find(|(t, _)| t == tuple).map(|(_, o)| o)
    }
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let written = self
            .outcomes
            .iter()
            .filter(|(_, o)| matches!(o, MatrixOutcome::Written { .. }))
            .count();
        write!(
            f,
            "{} artifacts, {} records ({} ignored), {}/{} matrices written",
            self.artifacts,
            self.records,
            self.ignored,
            written,
            self.outcomes.len()
        )
    }
}

/// Collects records from batch artifacts into one matrix per requested
/// parameter tuple. Built fresh for every merge run.
pub struct MatrixAssembler {
    experiment_name: String,
    word_count: u64,
    parameters: ParameterSpace,
    languages: LanguageSet,
    matrices: Vec<Option<AssembledMatrix>>,
    summary: MergeSummary,
}

impl MatrixAssembler {
    pub fn new(
        experiment_name: impl Into<String>,
        word_count: u64,
        parameters: ParameterSpace,
        languages: LanguageSet,
    ) -> Self {
        let matrices = vec![None; parameters.len()];
        Self {
            experiment_name: experiment_name.into(),
            word_count,
            parameters,
            languages,
            matrices,
            summary: MergeSummary::default(),
        }
    }

    pub fn matrix(&self, tuple: &ParameterTuple) -> Option<&AssembledMatrix> {
        let index = self.parameters.index_of(tuple)?;
        self.matrices[index].as_ref()
    }

    /// Reads every artifact of the experiment. Stops at the first corrupt
    /// artifact or inconsistent record.
    pub fn scan(&mut self, store: &ResultStore) -> Result<(), PdError> {
        let artifacts = store.list_artifacts()?;
        info!(
            count = artifacts.len(),
            folder = %store.folder().display(),
            "collected batch artifacts"
        );
        for path in artifacts {
            let records = ResultStore::read_batch(&path)?;
            for record in &records {
                self.add_record(record, &path)?;
            }
            self.summary.artifacts += 1;
        }
        Ok(())
    }

    pub fn add_record(&mut self, record: &ResultRecord, source: &Path) -> Result<(), PdError> {
        let inconsistent = |reason: String| PdError::Consistency {
            path: source.to_path_buf(),
            reason,
        };
        if record.experiment_name != self.experiment_name {
            return Err(inconsistent(format!(
                "experiment name '{}' does not match '{}'",
                record.experiment_name, self.experiment_name
            )));
        }
        if record.word_count != self.word_count {
            return Err(inconsistent(format!(
                "word count {} does not match {}",
                record.word_count, self.word_count
            )));
        }
        self.summary.records += 1;

        let tuple = record.parameter_tuple();
        let Some(index) = self.parameters.index_of(&tuple) else {
            self.summary.ignored += 1;
            return Ok(());
        };

        let mut positions = [0usize; 2];
        for (slot, language) in positions.iter_mut().zip(&record.languages) {
            *slot = self
                .languages
                .position(language)
                .ok_or_else(|| inconsistent(format!("unknown language '{}'", language)))?;
        }
        let (i, j) = (positions[0].max(positions[1]), positions[0].min(positions[1]));
        if i == j {
            return Err(inconsistent(format!("job {} pairs a language with itself", record.job_id)));
        }

        let n = self.languages.len();
        let matrix = self.matrices[index].get_or_insert_with(|| AssembledMatrix::new(n));
        if let CellFill::Conflict { kept, rejected } = matrix.fill(i, j, record.value) {
            warn!(
                parameters = %tuple,
                pair = ?record.languages,
                kept,
                rejected,
                source = %source.display(),
                "conflicting values for the same cell"
            );
        }
        Ok(())
    }

    /// Writes every complete, conflict-free matrix into `output_folder` and
    /// reports the rest.
    pub fn finish(self, output_folder: &Path) -> Result<MergeSummary, PdError> {
        let mut summary = self.summary;
        let n = self.languages.len();
        let required = n * (n - 1) / 2;
        for (tuple, matrix) in self.parameters.iter().zip(&self.matrices) {
            let (missing, conflicts) = match matrix {
                Some(m) => (m.missing_cells(), m.conflicts()),
                None => (required, 0),
            };
            let outcome = match matrix {
                Some(m) if m.is_complete() && conflicts == 0 => {
                    let name = matrix_file_name(&self.experiment_name, self.word_count, tuple);
                    let path = output_folder.join(name);
                    matrix_file::write_matrix(&path, self.languages.labels(), m.values())?;
                    info!(parameters = %tuple, path = %path.display(), "matrix constructed");
                    MatrixOutcome::Written { path }
                }
                _ => {
                    warn!(
                        parameters = %tuple,
                        missing,
                        conflicts,
                        "matrix has incomplete data, not written"
                    );
                    MatrixOutcome::Rejected { missing, conflicts }
                }
            };
            summary.outcomes.push((tuple.clone(), outcome));
        }
        Ok(summary)
    }
}

/// Full merge run: scan all artifacts of the experiment in `data_folder`,
/// then emit complete matrices into `output_folder`.
pub fn merge(
    experiment_name: &str,
    word_count: u64,
    parameters: ParameterSpace,
    languages: LanguageSet,
    data_folder: &Path,
    output_folder: &Path,
) -> Result<MergeSummary, PdError> {
    let store = ResultStore::new(data_folder, experiment_name);
    let mut assembler = MatrixAssembler::new(experiment_name, word_count, parameters, languages);
    assembler.scan(&store)?;
    std::fs::create_dir_all(output_folder)?;
    assembler.finish(output_folder)
}
