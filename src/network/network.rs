use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{Error, Result},
    layers::dense::Dense,
    models::Model,
    network::spec::NetworkSpec,
    optim::Parameter,
};

/// Feed-forward stack of dense layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Dense>,
}

impl Network {
    /// Builds a network from (size, input_size, activation) tuples.
    pub fn new<R: Rng + ?Sized>(
        layer_specs: Vec<(usize, usize, ActivationFunction)>,
        rng: &mut R,
    ) -> Network {
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Dense::new(size, input_size, activation, rng))
            .collect();
        Network { layers }
    }

    /// Builds a network from a serializable `NetworkSpec`, checking that adjacent
    /// layer sizes line up.
    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;
        Ok(Network::new(
            spec.layers.iter()
                .map(|l| (l.size, l.input_size, l.activation))
                .collect(),
            rng,
        ))
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.biases.len()).sum()
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_size() {
            return Err(Error::shape(
                format!("{} input features", self.input_size()),
                format!("{} features", input.len()),
            ));
        }
        Ok(())
    }

    /// Inference with an input-length check, for externally supplied points.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;
        Ok(Model::forward(self, &input.to_vec()))
    }
}

impl Model for Network {
    type Input = Vec<f64>;

    /// Forward pass; stores activations in each layer for backprop.
    fn forward(&mut self, input: &Vec<f64>) -> Vec<f64> {
        let mut current = input.clone();
        for layer in &mut self.layers {
            layer.clear_cache();
            current = layer.forward(&current);
        }
        current
    }

    fn backward(&mut self, grad_output: &[f64]) {
        let mut delta = grad_output.to_vec();
        for layer in self.layers.iter_mut().rev() {
            delta = layer.backward(&delta);
        }
    }

    fn backward_logits(&mut self, grad_logits: &[f64]) {
        let Some((head, hidden)) = self.layers.split_last_mut() else {
            return;
        };
        let mut delta = head.backward_pre_activation(grad_logits);
        for layer in hidden.iter_mut().rev() {
            delta = layer.backward(&delta);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::config("network has no layers"));
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[1].input_size != pair[0].size {
                return Err(Error::config(format!(
                    "layer {} expects {} inputs but layer {} produces {}",
                    i + 1, pair[1].input_size, i, pair[0].size
                )));
            }
        }
        self.layers.iter().try_for_each(Dense::validate)
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        self.layers.iter_mut().flat_map(|l| l.parameters_mut()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::LossType;
    use crate::network::spec::LayerSpec;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn spec_with_mismatched_sizes_is_rejected() {
        let spec = NetworkSpec {
            name: "broken".into(),
            layers: vec![
                LayerSpec { size: 4, input_size: 2, activation: ActivationFunction::ReLU },
                LayerSpec { size: 2, input_size: 5, activation: ActivationFunction::Softmax },
            ],
            loss: LossType::CrossEntropy,
            metadata: None,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(Network::from_spec(&spec, &mut rng), Err(Error::Config(_))));
    }

    #[test]
    fn predict_checks_input_width() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut net = Network::new(vec![(3, 2, ActivationFunction::ReLU), (2, 3, ActivationFunction::Softmax)], &mut rng);
        assert_eq!(net.parameter_count(), 2 * 3 + 3 + 3 * 2 + 2);
        assert_eq!(net.predict(&[0.1, 0.2]).unwrap().len(), 2);
        assert!(matches!(net.predict(&[0.1]), Err(Error::Shape { .. })));
    }

    #[test]
    fn repeated_inference_does_not_grow_caches() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut net = Network::new(vec![(2, 2, ActivationFunction::Sigmoid)], &mut rng);
        for _ in 0..5 {
            net.forward(&vec![1.0, 0.0]);
        }
        net.backward(&[1.0, 1.0]);
        // A second backward would panic if more than one entry remained.
        let grad_sum: f64 = net.layers[0].biases.grad.data[0].iter().sum();
        assert!(grad_sum > 0.0);
    }
}
