use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::models::Model;
use crate::network::metadata::ModelMetadata;

/// A trained model plus the metadata needed to interpret its outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<M> {
    #[serde(default)]
    pub metadata: ModelMetadata,
    pub model: M,
}

impl<M: Serialize + DeserializeOwned> Checkpoint<M> {
    pub fn new(model: M, metadata: ModelMetadata) -> Self {
        Checkpoint { metadata, model }
    }

    /// Serializes the checkpoint to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }
}

impl<M: Model + DeserializeOwned> Checkpoint<M> {
    /// Deserializes a checkpoint previously written by `save_json` and
    /// rejects models whose layers do not fit together.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let checkpoint: Checkpoint<M> = load_json(path)?;
        checkpoint.model.validate()?;
        Ok(checkpoint)
    }
}

pub(crate) fn save_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    tracing::debug!(path = %path.display(), "wrote JSON");
    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
