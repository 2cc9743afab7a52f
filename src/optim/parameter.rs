use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// A trainable matrix together with its accumulated gradient.
///
/// The gradient is not serialized; after loading a checkpoint it starts
/// empty and is re-created on the first `accumulate`/`zero_grad`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub value: Matrix,
    #[serde(skip)]
    pub grad: Matrix,
}

impl Parameter {
    pub fn new(value: Matrix) -> Parameter {
        let grad = Matrix::zeros(value.rows, value.cols);
        Parameter { value, grad }
    }

    pub fn accumulate(&mut self, grad: &Matrix) {
        if !self.grad.same_shape(&self.value) {
            self.grad = Matrix::zeros(self.value.rows, self.value.cols);
        }
        self.grad.add_assign(grad);
    }

    pub fn zero_grad(&mut self) {
        self.grad = Matrix::zeros(self.value.rows, self.value.cols);
    }

    pub fn scale_grad(&mut self, factor: f64) {
        self.grad = self.grad.scale(factor);
    }

    /// Number of scalar weights held by this parameter.
    pub fn len(&self) -> usize {
        self.value.rows * self.value.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gradient with the value's shape, even if nothing has accumulated yet.
    pub(crate) fn grad_or_zeros(&self) -> Matrix {
        if self.grad.same_shape(&self.value) {
            self.grad.clone()
        } else {
            Matrix::zeros(self.value.rows, self.value.cols)
        }
    }
}

/// Rescales every gradient so their global L2 norm is at most `max_norm`.
/// Returns the norm measured before clipping.
pub fn clip_grad_norm(params: &mut [&mut Parameter], max_norm: f64) -> f64 {
    let total = params.iter()
        .map(|p| p.grad.norm_squared())
        .sum::<f64>()
        .sqrt();
    if total > max_norm && total > 0.0 {
        let factor = max_norm / total;
        for p in params.iter_mut() {
            p.scale_grad(factor);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_sums_and_zero_grad_resets() {
        let mut p = Parameter::new(Matrix::zeros(1, 2));
        p.accumulate(&Matrix::row(vec![1.0, 2.0]));
        p.accumulate(&Matrix::row(vec![0.5, 0.5]));
        assert_eq!(p.grad.data, vec![vec![1.5, 2.5]]);
        p.zero_grad();
        assert_eq!(p.grad.data, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn clipping_caps_global_norm() {
        let mut a = Parameter::new(Matrix::zeros(1, 1));
        let mut b = Parameter::new(Matrix::zeros(1, 1));
        a.accumulate(&Matrix::row(vec![3.0]));
        b.accumulate(&Matrix::row(vec![4.0]));
        let before = clip_grad_norm(&mut [&mut a, &mut b], 1.0);
        assert!((before - 5.0).abs() < 1e-12);
        assert!((a.grad.data[0][0] - 0.6).abs() < 1e-12);
        assert!((b.grad.data[0][0] - 0.8).abs() < 1e-12);
    }
}
