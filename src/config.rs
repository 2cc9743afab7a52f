//! Per-exercise settings.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes; command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::loss::LossType;
use crate::network::checkpoint::load_json;
use crate::optim::OptimizerConfig;

/// Reads a config file; missing keys fall back to the type's defaults.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let config = load_json(path)?;
    tracing::info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonsConfig {
    pub n_samples: usize,
    pub noise: f64,
    pub test_fraction: f64,
    pub hidden_layers: Vec<usize>,
    /// `cross_entropy` gives a 2-way Softmax head; `binary_cross_entropy`
    /// and `mse` give a single Sigmoid unit.
    pub loss: LossType,
    pub optimizer: OptimizerConfig,
    pub epochs: usize,
    pub batch_size: usize,
    pub log_every: usize,
    pub seed: Option<u64>,
    pub plot: bool,
    pub save_model: Option<PathBuf>,
}

impl Default for MoonsConfig {
    fn default() -> Self {
        MoonsConfig {
            n_samples: 1000,
            noise: 0.2,
            test_fraction: 0.2,
            hidden_layers: vec![16, 16],
            loss: LossType::CrossEntropy,
            optimizer: OptimizerConfig::Adam { learning_rate: 0.01 },
            epochs: 100,
            batch_size: 32,
            log_every: 10,
            seed: None,
            plot: true,
            save_model: None,
        }
    }
}

impl MoonsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_samples < 4 {
            return Err(Error::config("moons needs at least 4 samples"));
        }
        if self.noise < 0.0 {
            return Err(Error::config("noise must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Directory of `<Category>.txt` files, one name per line.
    pub data_dir: PathBuf,
    pub hidden_size: usize,
    pub test_fraction: f64,
    pub optimizer: OptimizerConfig,
    pub epochs: usize,
    pub batch_size: usize,
    pub clip_norm: Option<f64>,
    pub log_every: usize,
    /// Names to classify after training (top-3 printed for each).
    pub predict: Vec<String>,
    pub seed: Option<u64>,
    pub plot: bool,
    pub save_model: Option<PathBuf>,
}

impl Default for NamesConfig {
    fn default() -> Self {
        NamesConfig {
            data_dir: PathBuf::from("data/names"),
            hidden_size: 128,
            test_fraction: 0.1,
            optimizer: OptimizerConfig::Sgd { learning_rate: 0.005, momentum: 0.0 },
            epochs: 5,
            batch_size: 1,
            clip_norm: Some(5.0),
            log_every: 1,
            predict: vec!["Dovesky".into(), "Jackson".into(), "Satoshi".into()],
            seed: None,
            plot: true,
            save_model: None,
        }
    }
}

impl NamesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_size == 0 {
            return Err(Error::config("hidden_size must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgesConfig {
    /// `ID,Class` listing of the labelled images.
    pub labels_csv: PathBuf,
    pub image_dir: PathBuf,
    /// Preprocessed tensors; read instead of decoding images when present.
    pub tensor_cache: Option<PathBuf>,
    pub image_size: u32,
    /// Only use the first N listed images.
    pub limit: Option<usize>,
    pub test_fraction: f64,
    pub optimizer: OptimizerConfig,
    pub epochs: usize,
    pub batch_size: usize,
    pub log_every: usize,
    /// How many test images to list with their predictions.
    pub show_predictions: usize,
    /// Unlabelled `ID` listing to classify after training.
    pub predict_csv: Option<PathBuf>,
    pub predict_image_dir: Option<PathBuf>,
    /// Where to write `ID,Class` predictions for `predict_csv`.
    pub predictions_out: PathBuf,
    pub seed: Option<u64>,
    pub plot: bool,
    pub save_model: Option<PathBuf>,
}

impl Default for AgesConfig {
    fn default() -> Self {
        AgesConfig {
            labels_csv: PathBuf::from("data/ages/train.csv"),
            image_dir: PathBuf::from("data/ages/Train"),
            tensor_cache: None,
            image_size: 32,
            limit: None,
            test_fraction: 0.2,
            optimizer: OptimizerConfig::Adam { learning_rate: 0.001 },
            epochs: 10,
            batch_size: 32,
            log_every: 1,
            show_predictions: 10,
            predict_csv: None,
            predict_image_dir: None,
            predictions_out: PathBuf::from("predictions.csv"),
            seed: None,
            plot: true,
            save_model: None,
        }
    }
}

impl AgesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.image_size < 4 {
            return Err(Error::config("image_size must be at least 4 to pool twice"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: MoonsConfig = serde_json::from_str(r#"{ "epochs": 3, "optimizer": { "kind": "sgd", "learning_rate": 0.5 } }"#).unwrap();
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.n_samples, 1000);
        assert_eq!(cfg.optimizer, OptimizerConfig::Sgd { learning_rate: 0.5, momentum: 0.0 });
    }

    #[test]
    fn loss_names_are_snake_case() {
        let cfg: MoonsConfig = serde_json::from_str(r#"{ "loss": "binary_cross_entropy" }"#).unwrap();
        assert_eq!(cfg.loss, LossType::BinaryCrossEntropy);
    }
}
