use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{Error, Result},
    math::{matrix::Matrix, tensor::Tensor3},
    optim::Parameter,
};

/// 2-D convolution (stride 1, square kernel, zero padding) with a fused
/// element-wise activation.
///
/// Weights are stored as `out_channels x (in_channels * kernel * kernel)`;
/// column `(ic * kernel + ky) * kernel + kx` holds the tap for input
/// channel `ic` at kernel offset `(ky, kx)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conv2d {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel: usize,
    pub padding: usize,
    pub weights: Parameter,
    pub biases: Parameter,
    pub activator: ActivationFunction,
    #[serde(skip)]
    cache: Option<(Tensor3, Tensor3)>,
}

impl Conv2d {
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        padding: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Conv2d {
        assert!(activation != ActivationFunction::Softmax, "Conv2d does not support Softmax");
        let fan_in = in_channels * kernel * kernel;
        let weights = if activation.prefers_he_init() {
            Matrix::he(out_channels, fan_in, fan_in, rng)
        } else {
            Matrix::xavier(out_channels, fan_in, fan_in, rng)
        };
        Conv2d {
            in_channels,
            out_channels,
            kernel,
            padding,
            weights: Parameter::new(weights),
            biases: Parameter::new(Matrix::zeros(1, out_channels)),
            activator: activation,
            cache: None,
        }
    }

    /// Checks the kernel bank against the declared channels and kernel size.
    pub fn validate(&self) -> Result<()> {
        if self.kernel == 0 || self.in_channels == 0 || self.out_channels == 0 {
            return Err(Error::config("Conv2d needs a kernel and at least one channel each way"));
        }
        let fan_in = self.in_channels * self.kernel * self.kernel;
        self.weights.value.expect_shape(self.out_channels, fan_in, "conv weights")?;
        self.biases.value.expect_shape(1, self.out_channels, "conv biases")
    }

    /// Spatial output size for an `height x width` input.
    pub fn output_shape(&self, height: usize, width: usize) -> (usize, usize) {
        (
            (height + 2 * self.padding + 1).saturating_sub(self.kernel),
            (width + 2 * self.padding + 1).saturating_sub(self.kernel),
        )
    }

    /// Input coordinate for output `o` and kernel offset `k`, if inside the
    /// unpadded input.
    #[inline]
    fn source(&self, o: usize, k: usize, limit: usize) -> Option<usize> {
        (o + k).checked_sub(self.padding).filter(|&i| i < limit)
    }

    pub fn forward(&mut self, input: &Tensor3) -> Tensor3 {
        assert_eq!(input.channels, self.in_channels, "Conv2d input channel mismatch");
        let (out_h, out_w) = self.output_shape(input.height, input.width);
        let k = self.kernel;
        let mut z = Tensor3::zeros(self.out_channels, out_h, out_w);

        for oc in 0..self.out_channels {
            let w_row = &self.weights.value.data[oc];
            let bias = self.biases.value.data[0][oc];
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut sum = bias;
                    for ic in 0..self.in_channels {
                        for ky in 0..k {
                            let Some(iy) = self.source(oy, ky, input.height) else { continue };
                            for kx in 0..k {
                                let Some(ix) = self.source(ox, kx, input.width) else { continue };
                                sum += w_row[(ic * k + ky) * k + kx] * input.get(ic, iy, ix);
                            }
                        }
                    }
                    z.set(oc, oy, ox, sum);
                }
            }
        }

        let a = z.map(|v| self.activator.function(v));
        self.cache = Some((input.clone(), z));
        a
    }

    /// Accumulates weight/bias gradients and returns ∂L/∂input.
    pub fn backward(&mut self, grad_output: &Tensor3) -> Tensor3 {
        let (input, z) = self.cache.take()
            .expect("Conv2d::backward called without a matching forward");
        let k = self.kernel;
        let mut grad_w = Matrix::zeros(self.weights.value.rows, self.weights.value.cols);
        let mut grad_b = Matrix::zeros(1, self.out_channels);
        let mut grad_in = Tensor3::zeros(input.channels, input.height, input.width);

        for oc in 0..self.out_channels {
            for oy in 0..z.height {
                for ox in 0..z.width {
                    let delta = grad_output.get(oc, oy, ox)
                        * self.activator.derivative(z.get(oc, oy, ox));
                    if delta == 0.0 {
                        continue;
                    }
                    grad_b.data[0][oc] += delta;
                    for ic in 0..self.in_channels {
                        for ky in 0..k {
                            let Some(iy) = self.source(oy, ky, input.height) else { continue };
                            for kx in 0..k {
                                let Some(ix) = self.source(ox, kx, input.width) else { continue };
                                let col = (ic * k + ky) * k + kx;
                                grad_w.data[oc][col] += delta * input.get(ic, iy, ix);
                                let gi = grad_in.index(ic, iy, ix);
                                grad_in.data[gi] += delta * self.weights.value.data[oc][col];
                            }
                        }
                    }
                }
            }
        }

        self.weights.accumulate(&grad_w);
        self.biases.accumulate(&grad_b);
        grad_in
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        vec![&mut self.weights, &mut self.biases]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample_input(rng: &mut StdRng) -> Tensor3 {
        let data = (0..2 * 5 * 4).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
        Tensor3::from_flat(2, 5, 4, data).unwrap()
    }

    fn loss(out: &Tensor3, coeffs: &[f64]) -> f64 {
        out.data.iter().zip(coeffs).map(|(a, c)| a * c).sum()
    }

    #[test]
    fn padding_preserves_spatial_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let conv = Conv2d::new(3, 8, 3, 1, ActivationFunction::ReLU, &mut rng);
        assert_eq!(conv.output_shape(32, 32), (32, 32));
        let valid = Conv2d::new(3, 8, 3, 0, ActivationFunction::ReLU, &mut rng);
        assert_eq!(valid.output_shape(32, 30), (30, 28));
    }

    #[test]
    fn identity_kernel_copies_input() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut conv = Conv2d::new(1, 1, 3, 1, ActivationFunction::Identity, &mut rng);
        conv.weights.value = Matrix::row(vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let input = Tensor3::from_flat(1, 2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(conv.forward(&input), input);
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut conv = Conv2d::new(2, 3, 3, 1, ActivationFunction::Tanh, &mut rng);
        let input = sample_input(&mut rng);
        let coeffs: Vec<f64> = (0..3 * 5 * 4).map(|i| ((i % 7) as f64 - 3.0) * 0.25).collect();

        conv.forward(&input);
        let grad_output = Tensor3::from_flat(3, 5, 4, coeffs.clone()).unwrap();
        let grad_in = conv.backward(&grad_output);

        let h = 1e-6;
        for &(oc, col) in &[(0, 0), (1, 4), (2, 17), (0, 9)] {
            let orig = conv.weights.value.data[oc][col];
            conv.weights.value.data[oc][col] = orig + h;
            let plus = loss(&conv.forward(&input), &coeffs);
            conv.weights.value.data[oc][col] = orig - h;
            let minus = loss(&conv.forward(&input), &coeffs);
            conv.weights.value.data[oc][col] = orig;
            let numeric = (plus - minus) / (2.0 * h);
            assert!((numeric - conv.weights.grad.data[oc][col]).abs() < 1e-5, "w[{oc}][{col}]");
        }

        for &i in &[0usize, 7, 21, 39] {
            let mut shifted = input.clone();
            shifted.data[i] += h;
            let plus = loss(&conv.forward(&shifted), &coeffs);
            shifted.data[i] -= 2.0 * h;
            let minus = loss(&conv.forward(&shifted), &coeffs);
            let numeric = (plus - minus) / (2.0 * h);
            assert!((numeric - grad_in.data[i]).abs() < 1e-5, "input[{i}]");
        }

        let bias_sum: f64 = conv.biases.grad.data[0].iter().sum();
        assert!(bias_sum.is_finite());
    }
}
