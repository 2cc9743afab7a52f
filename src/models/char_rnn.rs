use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{Error, Result},
    layers::{dense::Dense, recurrent::RnnCell},
    models::Model,
    optim::Parameter,
};

/// Character-level classifier: an `RnnCell` reads one one-hot letter per
/// step and a Softmax layer maps the final hidden state to categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharRnn {
    pub cell: RnnCell,
    pub hidden_to_output: Dense,
}

impl CharRnn {
    pub fn new<R: Rng + ?Sized>(
        n_letters: usize,
        hidden_size: usize,
        n_categories: usize,
        rng: &mut R,
    ) -> CharRnn {
        CharRnn {
            cell: RnnCell::new(n_letters, hidden_size, rng),
            hidden_to_output: Dense::new(n_categories, hidden_size, ActivationFunction::Softmax, rng),
        }
    }

    pub fn n_categories(&self) -> usize {
        self.hidden_to_output.size
    }

    pub fn hidden_size(&self) -> usize {
        self.cell.hidden_size
    }
}

impl Model for CharRnn {
    type Input = Vec<Vec<f64>>;

    /// Runs the whole sequence and classifies from the last hidden state.
    /// An empty sequence classifies the initial (all-zero) hidden state.
    fn forward(&mut self, sequence: &Vec<Vec<f64>>) -> Vec<f64> {
        self.cell.clear_cache();
        self.hidden_to_output.clear_cache();
        let mut hidden = self.cell.init_hidden();
        for letter in sequence {
            hidden = self.cell.step(letter, &hidden);
        }
        self.hidden_to_output.forward(&hidden)
    }

    fn backward(&mut self, grad_output: &[f64]) {
        let grad_hidden = self.hidden_to_output.backward(grad_output);
        self.cell.backward_through_time(&grad_hidden);
    }

    fn validate(&self) -> Result<()> {
        self.cell.validate()?;
        if self.hidden_to_output.input_size != self.cell.hidden_size {
            return Err(Error::config(format!(
                "output layer reads {} hidden units but the cell has {}",
                self.hidden_to_output.input_size, self.cell.hidden_size
            )));
        }
        self.hidden_to_output.validate()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let mut params = self.cell.parameters_mut();
        params.extend(self.hidden_to_output.parameters_mut());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::LossType;
    use rand::{rngs::StdRng, SeedableRng};

    fn one_hot(i: usize, n: usize) -> Vec<f64> {
        let mut v = vec![0.0; n];
        v[i] = 1.0;
        v
    }

    #[test]
    fn output_is_distribution_over_categories() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut rnn = CharRnn::new(5, 8, 3, &mut rng);
        let out = rnn.forward(&vec![one_hot(0, 5), one_hot(4, 5)]);
        assert_eq!(out.len(), 3);
        assert!((out.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(rnn.parameters_mut().len(), 6);
    }

    #[test]
    fn cross_entropy_gradient_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut rnn = CharRnn::new(4, 5, 3, &mut rng);
        let seq = vec![one_hot(1, 4), one_hot(3, 4), one_hot(0, 4)];
        let target = one_hot(2, 3);
        let loss = LossType::CrossEntropy;

        let out = rnn.forward(&seq);
        rnn.backward(&loss.derivative(&out, &target));

        let h = 1e-6;
        for &(i, j) in &[(0, 0), (4, 2), (2, 1)] {
            let orig = rnn.hidden_to_output.weights.value.data[i][j];
            rnn.hidden_to_output.weights.value.data[i][j] = orig + h;
            let plus = loss.loss(&rnn.forward(&seq), &target);
            rnn.hidden_to_output.weights.value.data[i][j] = orig - h;
            let minus = loss.loss(&rnn.forward(&seq), &target);
            rnn.hidden_to_output.weights.value.data[i][j] = orig;
            let numeric = (plus - minus) / (2.0 * h);
            assert!((numeric - rnn.hidden_to_output.weights.grad.data[i][j]).abs() < 1e-5);
        }

        for &(i, j) in &[(1, 1), (3, 4)] {
            let orig = rnn.cell.input_to_hidden.weights.value.data[i][j];
            rnn.cell.input_to_hidden.weights.value.data[i][j] = orig + h;
            let plus = loss.loss(&rnn.forward(&seq), &target);
            rnn.cell.input_to_hidden.weights.value.data[i][j] = orig - h;
            let minus = loss.loss(&rnn.forward(&seq), &target);
            rnn.cell.input_to_hidden.weights.value.data[i][j] = orig;
            let numeric = (plus - minus) / (2.0 * h);
            assert!((numeric - rnn.cell.input_to_hidden.weights.grad.data[i][j]).abs() < 1e-5);
        }
    }

    #[test]
    fn validate_rejects_mismatched_head() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut rnn = CharRnn::new(4, 5, 3, &mut rng);
        assert!(rnn.validate().is_ok());
        rnn.hidden_to_output = Dense::new(3, 6, ActivationFunction::Softmax, &mut rng);
        assert!(matches!(rnn.validate(), Err(Error::Config(_))));

        let mut rnn = CharRnn::new(4, 5, 3, &mut rng);
        rnn.cell.hidden_to_hidden.weights.value.cols = 4;
        assert!(matches!(rnn.validate(), Err(Error::Shape { .. })));
    }
}
