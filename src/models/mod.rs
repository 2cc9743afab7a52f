pub mod age_cnn;
pub mod char_rnn;

pub use age_cnn::AgeCnn;
pub use char_rnn::CharRnn;

use crate::error::Result;
use crate::optim::Parameter;

/// A differentiable classifier the training loop can drive.
///
/// `forward` must record whatever `backward` needs and must start from a
/// clean cache, so inference-only calls never accumulate state.
/// `backward` adds into each parameter's gradient; the caller zeroes them.
pub trait Model {
    type Input;

    fn forward(&mut self, input: &Self::Input) -> Vec<f64>;

    /// Back-propagates ∂L/∂output of the most recent `forward`.
    fn backward(&mut self, grad_output: &[f64]);

    /// Back-propagates a gradient already taken with respect to the output
    /// layer's pre-activation, skipping that layer's activation derivative.
    ///
    /// The default suits Softmax heads, whose derivative is 1.0 anyway.
    fn backward_logits(&mut self, grad_logits: &[f64]) {
        self.backward(grad_logits);
    }

    /// Structural check for models that arrive through deserialization:
    /// every weight matrix matches its declared shape and layers chain.
    fn validate(&self) -> Result<()>;

    /// Parameters in a fixed order (optimizers key their state on it).
    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    fn zero_grad(&mut self) {
        for p in self.parameters_mut() {
            p.zero_grad();
        }
    }
}
