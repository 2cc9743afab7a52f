use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::loss::loss_type::LossType;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`    : total number of full passes over the training data
/// - `batch_size`: samples per mini-batch; use `1` for online SGD
/// - `loss_type` : which loss function to use
/// - `log_every` : emit an `info` log line every N epochs (the last epoch
///                  is always logged); `0` disables per-epoch logging
/// - `clip_norm` : optional global gradient-norm cap applied before each
///                  optimizer step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub loss_type: LossType,
    #[serde(default = "default_log_every")]
    pub log_every: usize,
    #[serde(default)]
    pub clip_norm: Option<f64>,
}

fn default_log_every() -> usize {
    1
}

impl TrainConfig {
    /// Creates a `TrainConfig` that logs every epoch and does not clip.
    pub fn new(epochs: usize, batch_size: usize, loss_type: LossType) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            loss_type,
            log_every: default_log_every(),
            clip_norm: None,
        }
    }

    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    pub fn with_clip_norm(mut self, clip_norm: Option<f64>) -> Self {
        self.clip_norm = clip_norm;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::config("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be at least 1"));
        }
        if let Some(max) = self.clip_norm {
            if max.is_nan() || max <= 0.0 {
                return Err(Error::config(format!("clip_norm must be positive, got {max}")));
            }
        }
        Ok(())
    }
}
