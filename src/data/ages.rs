use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::data::csv::CsvTable;
use crate::data::image::{image_to_tensor, RGB_CHANNELS};
use crate::error::{Error, Result};
use crate::math::tensor::Tensor3;
use crate::network::checkpoint::{load_json, save_json};

/// Age bucket used as the class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Young,
    Middle,
    Old,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [AgeGroup::Young, AgeGroup::Middle, AgeGroup::Old];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<AgeGroup> {
        AgeGroup::ALL.get(index).copied()
    }

    /// Label as written in the CSV files.
    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::Young => "YOUNG",
            AgeGroup::Middle => "MIDDLE",
            AgeGroup::Old => "OLD",
        }
    }

    pub fn labels() -> Vec<String> {
        AgeGroup::ALL.iter().map(|g| g.as_str().to_string()).collect()
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<AgeGroup> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YOUNG" => Ok(AgeGroup::Young),
            "MIDDLE" => Ok(AgeGroup::Middle),
            "OLD" => Ok(AgeGroup::Old),
            other => Err(Error::data(format!("unknown age group '{other}'"))),
        }
    }
}

/// Reads `ID,Class` records. Row errors report the 1-based data row.
pub fn read_label_csv(path: &Path) -> Result<Vec<(String, AgeGroup)>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let table = CsvTable::parse(&text)?;
    let id_col = table.column("ID")?;
    let class_col = table.column("Class")?;

    table.rows.iter().enumerate()
        .map(|(i, row)| -> Result<(String, AgeGroup)> {
            let id = row.get(id_col)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::data(format!("row {}: missing ID", i + 1)))?;
            let class = row.get(class_col)
                .ok_or_else(|| Error::data(format!("row {}: missing Class", i + 1)))?
                .parse::<AgeGroup>()
                .map_err(|e| Error::data(format!("row {}: {e}", i + 1)))?;
            Ok((id, class))
        })
        .collect()
}

/// Reads the `ID` column of an unlabeled listing (e.g. `test.csv`).
pub fn read_id_csv(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let table = CsvTable::parse(&text)?;
    let id_col = table.column("ID")?;
    Ok(table.rows.iter()
        .filter_map(|row| row.get(id_col))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Preprocessed image tensors with their labels, cacheable as JSON so the
/// decode/resize step runs once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTensorSet {
    pub width: usize,
    pub height: usize,
    pub ids: Vec<String>,
    pub images: Vec<Tensor3>,
    pub labels: Vec<AgeGroup>,
}

impl ImageTensorSet {
    /// Decodes every image listed in `labels_csv` from `image_dir`.
    pub fn from_directory(
        labels_csv: &Path,
        image_dir: &Path,
        width: u32,
        height: u32,
        limit: Option<usize>,
    ) -> Result<ImageTensorSet> {
        let mut records = read_label_csv(labels_csv)?;
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        if records.is_empty() {
            return Err(Error::data(format!("'{}' lists no images", labels_csv.display())));
        }

        let mut set = ImageTensorSet {
            width: width as usize,
            height: height as usize,
            ids: Vec::with_capacity(records.len()),
            images: Vec::with_capacity(records.len()),
            labels: Vec::with_capacity(records.len()),
        };
        for (i, (id, group)) in records.into_iter().enumerate() {
            let tensor = image_to_tensor(&image_dir.join(&id), width, height)?;
            set.ids.push(id);
            set.images.push(tensor);
            set.labels.push(group);
            if (i + 1) % 1000 == 0 {
                tracing::info!(decoded = i + 1, "preprocessing images");
            }
        }
        tracing::info!(images = set.len(), width, height, "preprocessed image set");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.images.first().map_or(RGB_CHANNELS, |t| t.channels)
    }

    /// Checks that ids, images and labels line up, that every tensor holds
    /// as many values as its shape declares, and that all share one shape.
    pub fn validate(&self) -> Result<()> {
        if self.ids.len() != self.images.len() || self.labels.len() != self.images.len() {
            return Err(Error::data(format!(
                "tensor set has {} ids, {} images, {} labels",
                self.ids.len(), self.images.len(), self.labels.len()
            )));
        }
        for (id, t) in self.ids.iter().zip(&self.images) {
            t.validate().map_err(|e| match e {
                Error::Shape { expected, found } => Error::Shape { expected, found: format!("{found} for '{id}'") },
                other => other,
            })?;
        }
        let expected = (self.channels(), self.height, self.width);
        if let Some((id, t)) = self.ids.iter().zip(&self.images).find(|(_, t)| t.shape() != expected) {
            return Err(Error::shape(
                format!("{:?}", expected),
                format!("{:?} for '{id}'", t.shape()),
            ));
        }
        Ok(())
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<ImageTensorSet> {
        let set: ImageTensorSet = load_json(path)?;
        set.validate()?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_groups_case_insensitively() {
        assert_eq!(" middle ".parse::<AgeGroup>().unwrap(), AgeGroup::Middle);
        assert_eq!("OLD".parse::<AgeGroup>().unwrap().index(), 2);
        assert!("teen".parse::<AgeGroup>().is_err());
        assert_eq!(AgeGroup::from_index(0), Some(AgeGroup::Young));
        assert_eq!(AgeGroup::from_index(3), None);
    }

    #[test]
    fn validate_catches_mismatched_shapes() {
        let set = ImageTensorSet {
            width: 2,
            height: 2,
            ids: vec!["a".into(), "b".into()],
            images: vec![Tensor3::zeros(3, 2, 2), Tensor3::zeros(3, 2, 3)],
            labels: vec![AgeGroup::Old, AgeGroup::Young],
        };
        assert!(matches!(set.validate(), Err(Error::Shape { .. })));
    }

    #[test]
    fn truncated_tensor_cache_is_rejected_on_load() {
        let path = std::env::temp_dir().join("nn_exercises_truncated_cache.json");
        let cache = serde_json::json!({
            "width": 8,
            "height": 8,
            "ids": ["a.png", "b.png"],
            "images": [
                { "channels": 3, "height": 8, "width": 8, "data": [0.5, 0.5] },
                { "channels": 3, "height": 8, "width": 8, "data": [0.5, 0.5] }
            ],
            "labels": ["Young", "Old"]
        });
        std::fs::write(&path, cache.to_string()).unwrap();

        let loaded = ImageTensorSet::load_json(&path);
        std::fs::remove_file(&path).ok();
        match loaded {
            Err(Error::Shape { found, .. }) => assert!(found.contains("a.png"), "{found}"),
            other => panic!("expected a shape error, got {other:?}"),
        }
    }
}
