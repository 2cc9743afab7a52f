use crate::{loss::loss_type::LossType, models::Model};

/// Forward pass, loss, and backward pass for one sample.
///
/// Gradients are *added* to the model's parameters; the caller decides when
/// to average, step, and zero them. Returns the model output and the loss.
pub fn train_sample<M: Model>(
    model: &mut M,
    input: &M::Input,
    expected: &[f64],
    loss_type: LossType,
) -> (Vec<f64>, f64) {
    // Forward pass
    let output = model.forward(input);

    let loss = loss_type.loss(&output, expected);

    // BCE goes straight to the Sigmoid logits; everything else starts from
    // ∂L/∂a_output (error in output activation space).
    match loss_type.logit_derivative(&output, expected) {
        Some(grad_logits) => model.backward_logits(&grad_logits),
        None => model.backward(&loss_type.derivative(&output, expected)),
    }

    (output, loss)
}
