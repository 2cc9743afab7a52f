use crate::math::matrix::Matrix;
use crate::optim::{Optimizer, Parameter};

/// Stochastic gradient descent with optional classical momentum.
///
/// With `momentum == 0.0` this is the plain `w -= lr * grad` update.
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    velocities: Vec<Matrix>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd::with_momentum(learning_rate, 0.0)
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum, velocities: Vec::new() }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        if self.momentum == 0.0 {
            for p in params.iter_mut() {
                let grad = p.grad_or_zeros();
                p.value = p.value.clone() - grad.scale(self.learning_rate);
            }
            return;
        }

        if self.velocities.len() != params.len() {
            self.velocities = params.iter()
                .map(|p| Matrix::zeros(p.value.rows, p.value.cols))
                .collect();
        }
        for (p, v) in params.iter_mut().zip(self.velocities.iter_mut()) {
            // v = μ·v + g ;  w -= lr·v
            *v = v.scale(self.momentum) + p.grad_or_zeros();
            p.value = p.value.clone() - v.scale(self.learning_rate);
        }
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
