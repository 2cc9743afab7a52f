pub mod adam;
pub mod parameter;
pub mod sgd;

use serde::{Serialize, Deserialize};

pub use adam::Adam;
pub use parameter::{clip_grad_norm, Parameter};
pub use sgd::Sgd;

/// Updates parameters from their accumulated gradients.
///
/// Per-parameter state (momentum, moment estimates) is keyed by position,
/// so callers must pass parameters in the same order on every step.
pub trait Optimizer {
    fn step(&mut self, params: &mut [&mut Parameter]);

    fn learning_rate(&self) -> f64;
}

/// Serializable optimizer choice used by the exercise configs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd {
        learning_rate: f64,
        #[serde(default)]
        momentum: f64,
    },
    Adam { learning_rate: f64 },
}

impl OptimizerConfig {
    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            OptimizerConfig::Sgd { learning_rate, momentum } => {
                Box::new(Sgd::with_momentum(learning_rate, momentum))
            }
            OptimizerConfig::Adam { learning_rate } => Box::new(Adam::new(learning_rate)),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::Sgd { learning_rate, .. } | OptimizerConfig::Adam { learning_rate } => {
                learning_rate
            }
        }
    }

    /// Replaces the learning rate, keeping the optimizer kind.
    pub fn with_learning_rate(self, lr: f64) -> OptimizerConfig {
        match self {
            OptimizerConfig::Sgd { momentum, .. } => OptimizerConfig::Sgd { learning_rate: lr, momentum },
            OptimizerConfig::Adam { .. } => OptimizerConfig::Adam { learning_rate: lr },
        }
    }
}
