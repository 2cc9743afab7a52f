use serde::{Serialize, Deserialize};

/// Per-epoch training statistics returned by `train_loop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean training loss over all samples in this epoch.
    pub train_loss: f64,
    /// Mean validation loss, if a validation set was provided.
    pub val_loss: Option<f64>,
    /// Training accuracy as a fraction in [0, 1], measured after the epoch's updates.
    pub train_accuracy: f64,
    /// Validation accuracy as a fraction in [0, 1], if a validation set was provided.
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
