//! Strictly lower-triangular matrix text files.
//!
//! ```text
//! a b c
//! 0.1000000000
//! 0.2000000000 0.3000000000
//! ```
//!
//! The first line holds the labels; line `i` holds row `i` against columns
//! `0..i`.

use crate::parameters::ParameterTuple;
use crate::result_store::write_atomically;
use crate::PdError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DECIMAL_PLACES: usize = 10;

pub fn matrix_file_name(experiment_name: &str, word_count: u64, tuple: &ParameterTuple) -> String {
    format!(
        "pddmat.{}.n{}.{}.{}.d{}.txt",
        experiment_name, word_count, tuple.metric, tuple.distance_kind, tuple.dimension
    )
}

/// Renders the file contents. `values` is a row-major `n x n` grid; only
/// the strictly lower triangle is read.
pub fn render(labels: &[String], values: &[f64]) -> String {
    let n = labels.len();
    debug_assert_eq!(values.len(), n * n);
    let mut out = labels.join(" ");
    out.push('\n');
    for i in 1..n {
        let row: Vec<String> = values[i * n..i * n + i]
            .iter()
            .map(|&v| format!("{:.*}", DECIMAL_PLACES, if v == 0.0 { 0.0 } else { v }))
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

pub fn write_matrix(path: &Path, labels: &[String], values: &[f64]) -> Result<(), PdError> {
    let contents = render(labels, values);
    write_atomically(path, |writer| {
        writer.write_all(contents.as_bytes())?;
        Ok(())
    })
}

/// A matrix read back from disk, symmetric with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMatrix {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl LoadedMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.labels.len() + j]
    }

    pub fn label_position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

pub fn read_matrix(path: &Path) -> Result<LoadedMatrix, PdError> {
    let text = fs::read_to_string(path)?;
    parse(&text).map_err(|reason| PdError::corrupt(PathBuf::from(path), reason))
}

fn parse(text: &str) -> Result<LoadedMatrix, String> {
    let mut lines = text.lines();
    let labels: Vec<String> = lines
        .next()
        .ok_or("empty matrix file")?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let n = labels.len();
    let mut values = vec![0.0; n * n];

    let mut row = 0;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        row += 1;
        if row >= n {
            return Err(format!("more than {} rows for {} labels", n - 1, n));
        }
        let cells: Vec<&str> = line.split_whitespace().collect();
        if cells.len() != row {
            return Err(format!("row {} has {} values, expected {}", row, cells.len(), row));
        }
        for (col, cell) in cells.into_iter().enumerate() {
            let value: f64 = cell
                .parse()
                .map_err(|_| format!("row {} holds non-numeric value '{}'", row, cell))?;
            values[row * n + col] = value;
            values[col * n + row] = value;
        }
    }
    if n > 0 && row != n - 1 {
        return Err(format!("found {} rows, expected {}", row, n - 1));
    }
    Ok(LoadedMatrix { labels, values })
}
