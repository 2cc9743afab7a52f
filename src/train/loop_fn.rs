use std::time::Instant;

use rand::{seq::SliceRandom, Rng};

use crate::error::{Error, Result};
use crate::models::Model;
use crate::optim::{clip_grad_norm, Optimizer};
use crate::train::epoch_stats::EpochStats;
use crate::train::metrics::{accuracy, evaluate_loss};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_sample;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` for `config.epochs` epochs and returns one `EpochStats`
/// per completed epoch.
///
/// # Arguments
/// - `model`       : mutable reference to the model; modified in place
/// - `train_inputs`: training samples
/// - `train_labels`: corresponding targets, same length as `train_inputs`
/// - `validation`  : optional `(inputs, labels)` evaluated after every epoch
/// - `optimizer`   : applies the averaged mini-batch gradients
/// - `config`      : hyperparameters
/// - `rng`         : drives the per-epoch shuffle
///
/// # Errors
/// Empty or mismatched datasets and invalid hyperparameters are rejected
/// before any update happens.
pub fn train_loop<M: Model, R: Rng + ?Sized>(
    model: &mut M,
    train_inputs: &[M::Input],
    train_labels: &[Vec<f64>],
    validation: Option<(&[M::Input], &[Vec<f64>])>,
    optimizer: &mut dyn Optimizer,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<Vec<EpochStats>> {
    config.validate()?;
    if train_inputs.is_empty() {
        return Err(Error::data("training set is empty"));
    }
    if train_inputs.len() != train_labels.len() {
        return Err(Error::data(format!(
            "{} training inputs but {} labels",
            train_inputs.len(), train_labels.len()
        )));
    }
    if let Some((vi, vl)) = validation {
        if vi.len() != vl.len() {
            return Err(Error::data(format!(
                "{} validation inputs but {} labels", vi.len(), vl.len()
            )));
        }
    }

    tracing::info!(
        samples = train_inputs.len(),
        epochs = config.epochs,
        batch_size = config.batch_size,
        loss = ?config.loss_type,
        lr = optimizer.learning_rate(),
        "training started"
    );

    let mut history = Vec::with_capacity(config.epochs);
    model.zero_grad();

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let train_loss = run_one_epoch(model, train_inputs, train_labels, optimizer, config, rng);
        if !train_loss.is_finite() {
            return Err(Error::config(format!(
                "training diverged at epoch {epoch} (loss = {train_loss}); lower the learning rate"
            )));
        }

        let train_accuracy = accuracy(model, train_inputs, train_labels);

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = match validation {
            Some((vi, vl)) if !vi.is_empty() => (
                Some(evaluate_loss(model, vi, vl, config.loss_type)),
                Some(accuracy(model, vi, vl)),
            ),
            _ => (None, None),
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            val_loss,
            train_accuracy,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if config.log_every > 0 && (epoch % config.log_every == 0 || epoch == config.epochs) {
            tracing::info!(
                epoch,
                total = config.epochs,
                train_loss = stats.train_loss,
                train_acc = stats.train_accuracy,
                val_loss = ?stats.val_loss,
                val_acc = ?stats.val_accuracy,
                ms = stats.elapsed_ms,
                "epoch complete"
            );
        }
        history.push(stats);
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs one full epoch of mini-batch updates over the training data.
/// Returns the mean loss over all samples.
fn run_one_epoch<M: Model, R: Rng + ?Sized>(
    model: &mut M,
    inputs: &[M::Input],
    labels: &[Vec<f64>],
    optimizer: &mut dyn Optimizer,
    config: &TrainConfig,
    rng: &mut R,
) -> f64 {
    let n = inputs.len();
    let mut total_loss = 0.0;

    // Shuffle sample order each epoch.
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    for batch in indices.chunks(config.batch_size) {
        // Accumulate gradients over the mini-batch.
        for &idx in batch {
            let (_, loss) = train_sample(model, &inputs[idx], &labels[idx], config.loss_type);
            total_loss += loss;
        }

        // Average and apply.
        let inv_batch = 1.0 / batch.len() as f64;
        let mut params = model.parameters_mut();
        for p in params.iter_mut() {
            p.scale_grad(inv_batch);
        }
        if let Some(max_norm) = config.clip_norm {
            clip_grad_norm(&mut params, max_norm);
        }
        optimizer.step(&mut params);
        for p in params.iter_mut() {
            p.zero_grad();
        }
    }

    total_loss / n as f64
}
