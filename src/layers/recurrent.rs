use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{Error, Result},
    layers::dense::Dense,
    optim::Parameter,
};

/// Elman recurrent cell: `h_t = tanh(x_t·W_ih + b_ih + h_{t-1}·W_hh + b_hh)`.
///
/// Both linear transforms are `Identity` dense layers; their cache stacks
/// record one entry per time step, and `backward_through_time` pops them in
/// reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RnnCell {
    pub input_size: usize,
    pub hidden_size: usize,
    pub input_to_hidden: Dense,
    pub hidden_to_hidden: Dense,
    #[serde(skip)]
    pre_activations: Vec<Vec<f64>>,
}

impl RnnCell {
    pub fn new<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, rng: &mut R) -> RnnCell {
        RnnCell {
            input_size,
            hidden_size,
            input_to_hidden: Dense::new(hidden_size, input_size, ActivationFunction::Identity, rng),
            hidden_to_hidden: Dense::new(hidden_size, hidden_size, ActivationFunction::Identity, rng),
            pre_activations: Vec::new(),
        }
    }

    pub fn init_hidden(&self) -> Vec<f64> {
        vec![0.0; self.hidden_size]
    }

    /// One time step; records what BPTT needs.
    pub fn step(&mut self, input: &[f64], hidden: &[f64]) -> Vec<f64> {
        let from_input = self.input_to_hidden.forward(input);
        let from_hidden = self.hidden_to_hidden.forward(hidden);
        let z: Vec<f64> = from_input.iter().zip(from_hidden.iter()).map(|(a, b)| a + b).collect();
        let h = z.iter().map(|&v| v.tanh()).collect();
        self.pre_activations.push(z);
        h
    }

    /// Back-propagates ∂L/∂h_T through every recorded step, newest first.
    /// Returns ∂L/∂h_0 (the gradient reaching the initial hidden state).
    pub fn backward_through_time(&mut self, grad_hidden: &[f64]) -> Vec<f64> {
        let mut dh = grad_hidden.to_vec();
        while let Some(z) = self.pre_activations.pop() {
            let dz: Vec<f64> = dh.iter().zip(z.iter())
                .map(|(g, &v)| g * ActivationFunction::Tanh.derivative(v))
                .collect();
            // The input gradient is discarded: one-hot letters are data.
            self.input_to_hidden.backward(&dz);
            dh = self.hidden_to_hidden.backward(&dz);
        }
        dh
    }

    /// Checks that both transforms map into `hidden_size` from the right widths.
    pub fn validate(&self) -> Result<()> {
        let (i2h, h2h) = (&self.input_to_hidden, &self.hidden_to_hidden);
        if (i2h.input_size, i2h.size) != (self.input_size, self.hidden_size)
            || (h2h.input_size, h2h.size) != (self.hidden_size, self.hidden_size)
        {
            return Err(Error::config(format!(
                "RNN cell declares {} -> {} but its transforms are {} -> {} and {} -> {}",
                self.input_size, self.hidden_size, i2h.input_size, i2h.size, h2h.input_size, h2h.size
            )));
        }
        i2h.validate()?;
        h2h.validate()
    }

    #[cfg(test)]
    pub(crate) fn steps(&self) -> usize {
        self.pre_activations.len()
    }

    pub fn clear_cache(&mut self) {
        self.pre_activations.clear();
        self.input_to_hidden.clear_cache();
        self.hidden_to_hidden.clear_cache();
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let mut params = self.input_to_hidden.parameters_mut();
        params.extend(self.hidden_to_hidden.parameters_mut());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn unroll(cell: &mut RnnCell, sequence: &[Vec<f64>]) -> Vec<f64> {
        cell.clear_cache();
        let mut h = cell.init_hidden();
        for x in sequence {
            h = cell.step(x, &h);
        }
        h
    }

    fn loss(h: &[f64]) -> f64 {
        h.iter().enumerate().map(|(i, v)| (i as f64 + 1.0) * v).sum()
    }

    #[test]
    fn bptt_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cell = RnnCell::new(3, 4, &mut rng);
        let sequence = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0],
        ];
        let coeffs = [1.0, 2.0, 3.0, 4.0];

        unroll(&mut cell, &sequence);
        assert_eq!(cell.steps(), 3);
        cell.backward_through_time(&coeffs);
        assert_eq!(cell.steps(), 0);

        let h = 1e-6;
        for &(i, j) in &[(0, 0), (1, 3), (3, 2), (2, 1)] {
            let orig = cell.hidden_to_hidden.weights.value.data[i][j];
            cell.hidden_to_hidden.weights.value.data[i][j] = orig + h;
            let plus = loss(&unroll(&mut cell, &sequence));
            cell.hidden_to_hidden.weights.value.data[i][j] = orig - h;
            let minus = loss(&unroll(&mut cell, &sequence));
            cell.hidden_to_hidden.weights.value.data[i][j] = orig;
            let numeric = (plus - minus) / (2.0 * h);
            let analytic = cell.hidden_to_hidden.weights.grad.data[i][j];
            assert!((numeric - analytic).abs() < 1e-6, "W_hh[{i}][{j}]: {numeric} vs {analytic}");
        }

        for &(i, j) in &[(0, 1), (2, 3)] {
            let orig = cell.input_to_hidden.weights.value.data[i][j];
            cell.input_to_hidden.weights.value.data[i][j] = orig + h;
            let plus = loss(&unroll(&mut cell, &sequence));
            cell.input_to_hidden.weights.value.data[i][j] = orig - h;
            let minus = loss(&unroll(&mut cell, &sequence));
            cell.input_to_hidden.weights.value.data[i][j] = orig;
            let numeric = (plus - minus) / (2.0 * h);
            let analytic = cell.input_to_hidden.weights.grad.data[i][j];
            assert!((numeric - analytic).abs() < 1e-6, "W_ih[{i}][{j}]");
        }
    }
}
