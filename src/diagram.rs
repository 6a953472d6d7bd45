use crate::PdError;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Finite (birth, death) pairs of one homology dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceDiagram {
    pub points: Vec<(f64, f64)>,
}

impl PersistenceDiagram {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All dimensions read from one bars file, indexed by dimension.
#[derive(Debug, Clone, Default)]
pub struct Bars {
    diagrams: Vec<Option<PersistenceDiagram>>,
}

impl Bars {
    /// Parses the bars text format: blocks separated by blank lines, each
    /// block headed by its dimension on a line of its own, then one
    /// `birth death` pair per line. Bars with an infinite death are dropped.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut bars = Bars::default();
        let mut current: Option<(usize, Vec<(f64, f64)>)> = None;

        for (line_no, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => {
                    if let Some((dim, points)) = current.take() {
                        bars.insert(dim, points)?;
                    }
                }
                [dim] => {
                    if let Some((prev, points)) = current.take() {
                        bars.insert(prev, points)?;
                    }
                    let dim = dim.parse::<usize>().map_err(|_| {
                        format!("line {}: bad dimension header '{}'", line_no + 1, dim)
                    })?;
                    current = Some((dim, Vec::new()));
                }
                [birth, death] => {
                    let Some((_, points)) = current.as_mut() else {
                        let line = line_no + 1;
                        return Err(format!("line {}: bar outside of a dimension block", line));
                    };
                    let birth = parse_value(birth, line_no)?;
                    let death = parse_value(death, line_no)?;
                    if birth.is_finite() && death.is_finite() {
                        points.push((birth, death));
                    }
                }
                _ => return Err(format!("line {}: expected 'birth death'", line_no + 1)),
            }
        }
        if let Some((dim, points)) = current.take() {
            bars.insert(dim, points)?;
        }
        Ok(bars)
    }

    fn insert(&mut self, dim: usize, points: Vec<(f64, f64)>) -> Result<(), String> {
        if self.diagrams.len() <= dim {
            self.diagrams.resize(dim + 1, None);
        }
        if self.diagrams[dim].is_some() {
            return Err(format!("dimension {} appears twice", dim));
        }
        self.diagrams[dim] = Some(PersistenceDiagram::new(points));
        Ok(())
    }

    pub fn dimension(&self, dim: usize) -> Option<&PersistenceDiagram> {
        self.diagrams.get(dim).and_then(Option::as_ref)
    }
}

fn parse_value(field: &str, line_no: usize) -> Result<f64, String> {
    field
        .parse::<f64>()
        .map_err(|_| format!("line {}: bad number '{}'", line_no + 1, field))
}

/// Where the worker gets diagrams from.
pub trait DiagramSource {
    fn diagram(
        &mut self,
        language: &str,
        metric: &str,
        dimension: u32,
    ) -> Result<PersistenceDiagram, PdError>;
}

/// Reads `bars.<language>.<embedding>.n<words>.<metric>.d<maxdim>.txt` files
/// from one folder. Parsed files are kept for the lifetime of the source.
pub struct BarsFolder {
    folder: PathBuf,
    embedding_dimension: u32,
    word_count: u64,
    maxdim: u32,
    cache: FxHashMap<(String, String), Bars>,
}

impl BarsFolder {
    pub fn new(
        folder: impl Into<PathBuf>,
        embedding_dimension: u32,
        word_count: u64,
        maxdim: u32,
    ) -> Self {
        Self {
            folder: folder.into(),
            embedding_dimension,
            word_count,
            maxdim,
            cache: FxHashMap::default(),
        }
    }

    pub fn bars_path(&self, language: &str, metric: &str) -> PathBuf {
        self.folder.join(format!(
            "bars.{}.{}.n{}.{}.d{}.txt",
            language, self.embedding_dimension, self.word_count, metric, self.maxdim
        ))
    }

    fn load(&mut self, language: &str, metric: &str) -> Result<&Bars, PdError> {
        let key = (language.to_string(), metric.to_string());
        if !self.cache.contains_key(&key) {
            let path = self.bars_path(language, metric);
            let text = fs::read_to_string(&path)
                .map_err(|e| PdError::Diagram(format!("cannot read {}: {}", path.display(), e)))?;
            let bars = Bars::parse(&text)
                .map_err(|e| PdError::Diagram(format!("{}: {}", path.display(), e)))?;
            debug!(path = %path.display(), "loaded bars");
            self.cache.insert(key.clone(), bars);
        }
        self.cache.get(&key).ok_or_else(|| {
            PdError::Diagram(format!("bars for {} / {} not cached", language, metric))
        })
    }
}

impl DiagramSource for BarsFolder {
    fn diagram(
        &mut self,
        language: &str,
        metric: &str,
        dimension: u32,
    ) -> Result<PersistenceDiagram, PdError> {
        let path = self.bars_path(language, metric);
        let bars = self.load(language, metric)?;
        bars.dimension(dimension as usize).cloned().ok_or_else(|| {
            PdError::Diagram(format!("{} has no bars for dimension {}", path.display(), dimension))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "0\n0.000000 0.500000\n0.000000 0.250000\n0.000000 inf\n\n1\n0.400000 0.900000\n";

    #[test]
    fn test_parse_blocks_and_drop_infinite() {
        let bars = Bars::parse(SAMPLE).unwrap();
        assert_eq!(bars.dimension(0).unwrap().points, vec![(0.0, 0.5), (0.0, 0.25)]);
        assert_eq!(bars.dimension(1).unwrap().points, vec![(0.4, 0.9)]);
        assert!(bars.dimension(2).is_none());
    }

    #[test]
    fn test_parse_empty_dimension_block() {
        let bars = Bars::parse("0\n0.0 1.0\n\n1\n\n2\n1.0 2.0\n").unwrap();
        assert!(bars.dimension(1).unwrap().is_empty());
        assert_eq!(bars.dimension(2).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(Bars::parse("0.1 0.2\n").is_err());
        assert!(Bars::parse("0\n0.1 x\n").is_err());
        assert!(Bars::parse("0\n0.1 0.2 0.3\n").is_err());
        assert!(Bars::parse("0\n\n0\n").is_err());
    }

    #[test]
    fn test_bars_folder_reads_and_caches() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut source = BarsFolder::new(temp_dir.path(), 300, 1000, 1);
        let path = source.bars_path("cs", "euclidean");
        assert!(path.ends_with("bars.cs.300.n1000.euclidean.d1.txt"));
        fs::write(&path, SAMPLE).unwrap();

        let d1 = source.diagram("cs", "euclidean", 1).unwrap();
        assert_eq!(d1.points, vec![(0.4, 0.9)]);

        fs::remove_file(&path).unwrap();
        assert_eq!(source.diagram("cs", "euclidean", 0).unwrap().len(), 2);
        assert!(matches!(source.diagram("cs", "euclidean", 2), Err(PdError::Diagram(_))));
        assert!(matches!(source.diagram("sk", "euclidean", 0), Err(PdError::Diagram(_))));
    }
}
