use crate::{PdError, record::ResultRecord};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write-once batch artifacts for one experiment in one folder.
pub struct ResultStore {
    folder: PathBuf,
    experiment_name: String,
}

impl ResultStore {
    pub fn new(folder: impl Into<PathBuf>, experiment_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            experiment_name: experiment_name.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn prefix(&self) -> String {
        format!("distances.{}.part", self.experiment_name)
    }

    pub fn artifact_path(&self, task_id: u64) -> PathBuf {
        self.folder.join(format!("{}{:05}.json", self.prefix(), task_id))
    }

    /// Writes the whole batch in one go. Readers see either no artifact or
    /// the complete one.
    pub fn write_batch(&self, task_id: u64, records: &[ResultRecord]) -> Result<PathBuf, PdError> {
        fs::create_dir_all(&self.folder)?;
        let path = self.artifact_path(task_id);
        write_atomically(&path, |writer| {
            serde_json::to_writer(&mut *writer, records)?;
            Ok(())
        })?;
        debug!(path = %path.display(), records = records.len(), "batch written");
        Ok(path)
    }

    /// Artifacts of this experiment, sorted by file name.
    pub fn list_artifacts(&self) -> Result<Vec<PathBuf>, PdError> {
        let prefix = self.prefix();
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.folder)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let task = name.strip_prefix(&prefix).and_then(|rest| rest.strip_suffix(".json"));
            let Some(task) = task else {
                continue;
            };
            // Experiments named `<exp>.part...` share the prefix.
            if task.is_empty() || !task.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if entry.file_type()?.is_file() {
                artifacts.push(entry.path());
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }

    /// Parses one artifact. Any failure is fatal: a skipped file would look
    /// exactly like a batch that never ran.
    pub fn read_batch(path: &Path) -> Result<Vec<ResultRecord>, PdError> {
        let bytes = fs::read(path)?;
        let records: Vec<ResultRecord> =
            serde_json::from_slice(&bytes).map_err(|e| PdError::corrupt(path, e))?;
        for record in &records {
            record.validate().map_err(|reason| PdError::corrupt(path, reason))?;
        }
        Ok(records)
    }
}

/// Writes to a sibling `.tmp` file, syncs it, then renames it into place.
pub(crate) fn write_atomically<F>(path: &Path, fill: F) -> Result<(), PdError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), PdError>,
{
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = (|| -> Result<(), PdError> {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        fill(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
