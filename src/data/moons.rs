use std::f64::consts::PI;

use rand::Rng;

use crate::math::matrix::Matrix;

/// Two interleaving half circles with labels 0 (upper) and 1 (lower).
#[derive(Debug, Clone)]
pub struct MoonsDataset {
    pub points: Vec<[f64; 2]>,
    pub labels: Vec<usize>,
}

impl MoonsDataset {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(point, label)` pairs, convenient for shuffling and splitting.
    pub fn samples(&self) -> Vec<([f64; 2], usize)> {
        self.points.iter().copied().zip(self.labels.iter().copied()).collect()
    }
}

/// Generates the two-moons dataset.
///
/// `n_samples / 2` points lie on the upper half circle `(cos t, sin t)` and
/// the rest on the lower one `(1 - cos t, 1 - sin t - 0.5)`, with `t` evenly
/// spaced over `[0, π]`. Gaussian noise with standard deviation `noise` is
/// added to both coordinates.
pub fn make_moons<R: Rng + ?Sized>(n_samples: usize, noise: f64, rng: &mut R) -> MoonsDataset {
    let n_out = n_samples / 2;
    let n_in = n_samples - n_out;
    let mut points = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);

    for (n, label) in [(n_out, 0usize), (n_in, 1usize)] {
        for i in 0..n {
            let t = if n > 1 { PI * i as f64 / (n - 1) as f64 } else { 0.0 };
            let (x, y) = if label == 0 {
                (t.cos(), t.sin())
            } else {
                (1.0 - t.cos(), 1.0 - t.sin() - 0.5)
            };
            points.push([
                x + noise * Matrix::sample_standard_normal(rng),
                y + noise * Matrix::sample_standard_normal(rng),
            ]);
            labels.push(label);
        }
    }

    tracing::debug!(n_samples, noise, "generated two-moons dataset");
    MoonsDataset { points, labels }
}
