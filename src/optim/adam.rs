use crate::math::matrix::Matrix;
use crate::optim::{Optimizer, Parameter};

/// Adam with bias-corrected first and second moment estimates.
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    m: Vec<Matrix>,
    v: Vec<Matrix>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Adam {
        Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        if self.m.len() != params.len() {
            self.m = params.iter().map(|p| Matrix::zeros(p.value.rows, p.value.cols)).collect();
            self.v = self.m.clone();
            self.t = 0;
        }
        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);

        for ((p, m), v) in params.iter_mut().zip(self.m.iter_mut()).zip(self.v.iter_mut()) {
            let grad = p.grad_or_zeros();
            for i in 0..grad.rows {
                for j in 0..grad.cols {
                    let g = grad.data[i][j];
                    let mi = self.beta1 * m.data[i][j] + (1.0 - self.beta1) * g;
                    let vi = self.beta2 * v.data[i][j] + (1.0 - self.beta2) * g * g;
                    m.data[i][j] = mi;
                    v.data[i][j] = vi;
                    let m_hat = mi / bias1;
                    let v_hat = vi / bias2;
                    p.value.data[i][j] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
                }
            }
        }
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_has_magnitude_learning_rate() {
        // With bias correction the first update is lr · g / |g|.
        let mut p = Parameter::new(Matrix::row(vec![0.0, 0.0]));
        p.accumulate(&Matrix::row(vec![3.0, -0.01]));
        let mut adam = Adam::new(0.01);
        adam.step(&mut [&mut p]);
        assert!((p.value.data[0][0] - -0.01).abs() < 1e-6);
        assert!((p.value.data[0][1] - 0.01).abs() < 1e-6);
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut p = Parameter::new(Matrix::row(vec![5.0]));
        let mut adam = Adam::new(0.1);
        for _ in 0..500 {
            p.zero_grad();
            let w = p.value.data[0][0];
            p.accumulate(&Matrix::row(vec![2.0 * (w - 1.0)]));
            adam.step(&mut [&mut p]);
        }
        assert!((p.value.data[0][0] - 1.0).abs() < 0.05);
    }
}
