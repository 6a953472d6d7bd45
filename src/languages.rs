use crate::PdError;
use rustc_hash::FxHashMap;

/// Unique language ids in lexicographic order. A language's position in
/// this order is its row/column in every assembled matrix.
#[derive(Debug, Clone)]
pub struct LanguageSet {
    labels: Vec<String>,
    positions: FxHashMap<String, usize>,
}

impl LanguageSet {
    pub fn new<I, S>(languages: I) -> Result<Self, PdError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = languages.into_iter().map(Into::into).collect();
        labels.sort();
        if let Some(pair) = labels.windows(2).find(|w| w[0] == w[1]) {
            return Err(PdError::config(format!("duplicate language '{}'", pair[0])));
        }
        let bad_label = labels.iter().find(|l| l.is_empty() || l.chars().any(char::is_whitespace));
        if let Some(bad) = bad_label {
            return Err(PdError::config(format!("invalid language id {:?}", bad)));
        }
        if labels.len() < 2 {
            return Err(PdError::config(format!("need at least 2 languages, got {}", labels.len())));
        }
        let positions = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.clone(), index))
            .collect();
        Ok(Self { labels, positions })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, position: usize) -> Option<&str> {
        self.labels.get(position).map(String::as_str)
    }

    pub fn position(&self, language: &str) -> Option<usize> {
        self.positions.get(language).copied()
    }
}
