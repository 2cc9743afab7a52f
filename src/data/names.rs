use std::path::{Path, PathBuf};

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::error::{Error, Result};

/// Every character a name may contain after ASCII folding.
pub const ALL_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ .,;'";

/// Length of each one-hot letter vector.
pub const N_LETTERS: usize = 57;

/// Folds a Unicode string to the `ALL_LETTERS` alphabet: decomposes (NFD),
/// drops combining marks, then drops anything still outside the alphabet.
///
/// `"Ślusàrski"` becomes `"Slusarski"`.
pub fn unicode_to_ascii(s: &str) -> String {
    s.nfd()
        .filter(|&c| !is_combining_mark(c))
        .filter(|&c| ALL_LETTERS.contains(c))
        .collect()
}

/// Index of `letter` in `ALL_LETTERS`.
pub fn letter_to_index(letter: char) -> Option<usize> {
    ALL_LETTERS.find(letter)
}

/// One-hot vector per character. Characters outside the alphabet are
/// skipped, so callers should fold with `unicode_to_ascii` first.
pub fn line_to_sequence(line: &str) -> Vec<Vec<f64>> {
    line.chars()
        .filter_map(letter_to_index)
        .map(|i| {
            let mut v = vec![0.0; N_LETTERS];
            v[i] = 1.0;
            v
        })
        .collect()
}

/// Names grouped by category (language of origin).
#[derive(Debug, Clone)]
pub struct NameCorpus {
    /// Sorted category names; a sample's label indexes into this list.
    pub categories: Vec<String>,
    /// `(ascii name, category index)` pairs.
    pub samples: Vec<(String, usize)>,
}

impl NameCorpus {
    /// Reads every `*.txt` file in `dir`; the file stem is the category and
    /// each non-blank line is one name.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<NameCorpus> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(Error::data(format!(
                "no .txt files found in '{}'", dir.display()
            )));
        }

        let mut categories = Vec::with_capacity(files.len());
        let mut samples = Vec::new();
        for path in &files {
            let category = path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            let label = categories.len();
            let mut count = 0usize;
            for line in text.lines() {
                let raw = line.trim();
                if raw.is_empty() {
                    continue;
                }
                let name = unicode_to_ascii(raw);
                if name.is_empty() {
                    tracing::warn!(%category, raw, "skipping name with no encodable letters");
                    continue;
                }
                samples.push((name, label));
                count += 1;
            }
            tracing::debug!(%category, count, "loaded names");
            categories.push(category);
        }

        tracing::info!(
            categories = categories.len(),
            names = samples.len(),
            "loaded name corpus from {}", dir.display()
        );
        Ok(NameCorpus { categories, samples })
    }

    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    /// Number of names per category, in category order.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.categories.len()];
        for &(_, label) in &self.samples {
            counts[label] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_has_expected_size() {
        assert_eq!(ALL_LETTERS.chars().count(), N_LETTERS);
    }

    #[test]
    fn folds_accents_and_drops_foreign_symbols() {
        assert_eq!(unicode_to_ascii("Ślusàrski"), "Slusarski");
        assert_eq!(unicode_to_ascii("Müller-Lüdenscheidt"), "MullerLudenscheidt");
        assert_eq!(unicode_to_ascii("O'Néal"), "O'Neal");
        assert_eq!(unicode_to_ascii("李"), "");
    }

    #[test]
    fn sequence_is_one_hot_per_letter() {
        let seq = line_to_sequence("Jo");
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0].len(), N_LETTERS);
        assert_eq!(seq[0][letter_to_index('J').unwrap()], 1.0);
        assert_eq!(seq[1].iter().sum::<f64>(), 1.0);
        assert_eq!(letter_to_index('J'), Some(35));
    }
}
