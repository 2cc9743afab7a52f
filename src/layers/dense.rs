use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::Result,
    math::matrix::Matrix,
    optim::Parameter,
};

/// Fully connected layer: `a = σ(x·W + b)`.
///
/// Every `forward` pushes `(input, z)` onto a cache stack and every
/// `backward` pops one, so the same layer can be unrolled over the time
/// steps of a recurrent network and differentiated in reverse order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub size: usize,
    pub input_size: usize,
    pub weights: Parameter,
    pub biases: Parameter,
    pub activator: ActivationFunction,
    #[serde(skip)]
    cache: Vec<(Matrix, Matrix)>,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Dense {
        let weights = if activation.prefers_he_init() {
            Matrix::he(input_size, size, input_size, rng)
        } else {
            Matrix::xavier(input_size, size, input_size, rng)
        };

        Dense {
            size,
            input_size,
            weights: Parameter::new(weights),
            biases: Parameter::new(Matrix::zeros(1, size)),
            activator: activation,
            cache: Vec::new(),
        }
    }

    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let x = Matrix::row(input.to_vec());
        let z = &x * &self.weights.value + self.biases.value.clone();
        let a = self.activator.apply(&z.data[0]);
        self.cache.push((x, z));
        a
    }

    /// Back-propagates ∂L/∂a for the most recent cached forward call.
    ///
    /// Accumulates `dW = xᵀ·δ` and `db = δ` with `δ = ∂L/∂a ⊙ σ'(z)`, and
    /// returns ∂L/∂x = δ·Wᵀ.
    pub fn backward(&mut self, grad_output: &[f64]) -> Vec<f64> {
        let (x, z) = self.cache.pop()
            .expect("Dense::backward called without a matching forward");

        // Use pre-activation z so that derivative(z) = σ'(z) is computed correctly
        let act_derivative = z.map(|v| self.activator.derivative(v));
        let delta = Matrix::row(grad_output.to_vec()).hadamard(&act_derivative);
        self.apply_delta(&x, delta)
    }

    /// Like `backward`, but `grad_z` is already ∂L/∂z (for example `p - y`
    /// from Sigmoid with binary cross-entropy), so σ' is not applied.
    pub fn backward_pre_activation(&mut self, grad_z: &[f64]) -> Vec<f64> {
        let (x, _) = self.cache.pop()
            .expect("Dense::backward_pre_activation called without a matching forward");
        self.apply_delta(&x, Matrix::row(grad_z.to_vec()))
    }

    fn apply_delta(&mut self, x: &Matrix, delta: Matrix) -> Vec<f64> {
        self.weights.accumulate(&(&x.transpose() * &delta));
        self.biases.accumulate(&delta);
        (&delta * &self.weights.value.transpose()).into_row()
    }

    /// Checks the weight and bias shapes against `input_size` and `size`.
    pub fn validate(&self) -> Result<()> {
        self.weights.value.expect_shape(self.input_size, self.size, "dense weights")?;
        self.biases.value.expect_shape(1, self.size, "dense biases")
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.weights, &mut self.biases]
    }
}
