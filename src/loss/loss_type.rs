use serde::{Serialize, Deserialize};

use crate::loss::{BceLoss, CrossEntropyLoss, MseLoss};

/// Selects which loss function the training loop uses.
///
/// - `Mse`               : Mean-squared error; pair with Identity or Sigmoid output.
/// - `CrossEntropy`      : Categorical cross-entropy; pair with Softmax output.
///   The gradient is the combined Softmax+CE gradient (predicted - expected),
///   which matches the convention in `CrossEntropyLoss::derivative()`.
/// - `BinaryCrossEntropy`: Binary cross-entropy; pair with a single Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
    BinaryCrossEntropy,
}

impl LossType {
    /// Scalar loss for one sample.
    pub fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        match self {
            LossType::Mse                => MseLoss::loss(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss::loss(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
        }
    }

    /// Per-output gradient for one sample.
    pub fn derivative(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        match self {
            LossType::Mse                => MseLoss::derivative(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss::derivative(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
        }
    }

    /// Gradient with respect to the output layer's pre-activation, for losses
    /// that are combined with their head's activation. Cross-entropy needs no
    /// entry here because Softmax already reports a unit derivative.
    pub fn logit_derivative(&self, predicted: &[f64], expected: &[f64]) -> Option<Vec<f64>> {
        match self {
            LossType::BinaryCrossEntropy => Some(BceLoss::logit_derivative(predicted, expected)),
            LossType::Mse | LossType::CrossEntropy => None,
        }
    }

    /// Whether targets are one-hot class vectors (as opposed to a single 0/1).
    pub fn is_categorical(&self) -> bool {
        matches!(self, LossType::CrossEntropy)
    }
}
