//! The three end-to-end exercises. Each `run` is one linear procedure:
//! load or generate data, encode it, train a fixed architecture, then
//! print (and optionally plot) the results.

pub mod ages;
pub mod moons;
pub mod names;

use rand::{rngs::StdRng, SeedableRng};

use crate::train::epoch_stats::EpochStats;

/// What an exercise run produced, for callers that want more than stdout.
#[derive(Debug, Clone)]
pub struct Summary {
    pub history: Vec<EpochStats>,
    /// Accuracy on the held-out split, if one was made.
    pub test_accuracy: Option<f64>,
}

impl Summary {
    pub fn final_train_loss(&self) -> Option<f64> {
        self.history.last().map(|s| s.train_loss)
    }

    pub fn first_train_loss(&self) -> Option<f64> {
        self.history.first().map(|s| s.train_loss)
    }
}

/// Seeded generator when `seed` is given, OS entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            tracing::debug!(seed, "using fixed seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}
