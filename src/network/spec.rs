use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::loss::loss_type::LossType;
use crate::network::metadata::ModelMetadata;

/// Describes one layer in a network description.
///
/// Fields:
/// - `size`      : number of neurons in this layer
/// - `input_size`: number of neurons feeding into this layer (i.e. the output
///                  size of the previous layer, or the raw input dimension for
///                  the first layer)
/// - `activation`: activation function applied after the linear transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// A fully serializable description of a feed-forward architecture plus its
/// training loss type and optional metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Loss function to pair with this network during training.
    pub loss: LossType,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    /// Stacks `hidden` layers (all with `hidden_activation`) between
    /// `input_size` inputs and an output head chosen from the loss:
    /// Softmax over `n_classes` for cross-entropy, one Sigmoid unit otherwise.
    pub fn classifier(
        name: &str,
        input_size: usize,
        hidden: &[usize],
        hidden_activation: ActivationFunction,
        n_classes: usize,
        loss: LossType,
    ) -> NetworkSpec {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut fan_in = input_size;
        for &size in hidden {
            layers.push(LayerSpec { size, input_size: fan_in, activation: hidden_activation });
            fan_in = size;
        }
        let head = if loss.is_categorical() {
            LayerSpec { size: n_classes, input_size: fan_in, activation: ActivationFunction::Softmax }
        } else {
            LayerSpec { size: 1, input_size: fan_in, activation: ActivationFunction::Sigmoid }
        };
        layers.push(head);
        NetworkSpec { name: name.to_string(), layers, loss, metadata: None }
    }

    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::config(format!("network '{}' has no layers", self.name)));
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[1].input_size != pair[0].size {
                return Err(Error::config(format!(
                    "layer {} expects {} inputs but layer {} produces {}",
                    i + 1, pair[1].input_size, i, pair[0].size
                )));
            }
        }
        if self.layers.iter().any(|l| l.size == 0 || l.input_size == 0) {
            return Err(Error::config("layer sizes must be at least 1"));
        }
        let head = &self.layers[self.layers.len() - 1];
        let softmax_head = head.activation == ActivationFunction::Softmax;
        if softmax_head != self.loss.is_categorical() {
            return Err(Error::config("Softmax output must be paired with cross-entropy loss"));
        }
        if self.loss == LossType::BinaryCrossEntropy && head.activation != ActivationFunction::Sigmoid {
            return Err(Error::config("binary cross-entropy needs a Sigmoid output layer"));
        }
        Ok(())
    }
}
