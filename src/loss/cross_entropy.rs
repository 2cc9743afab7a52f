/// Categorical cross-entropy over Softmax probabilities.
pub struct CrossEntropyLoss;

const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// `-Σ yᵢ·ln(pᵢ)` for a one-hot (or soft) target `y`.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        -predicted.iter().zip(expected)
            .map(|(&p, &y)| y * (p + EPS).ln())
            .sum::<f64>()
    }

    /// Gradient with respect to the Softmax *logits*, `p - y`.
    ///
    /// The Softmax layer reports a derivative of 1.0, so this vector reaches
    /// the output layer's weights unchanged.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected).map(|(p, y)| p - y).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_correct_prediction_has_low_loss() {
        let good = CrossEntropyLoss::loss(&[0.05, 0.9, 0.05], &[0.0, 1.0, 0.0]);
        let bad = CrossEntropyLoss::loss(&[0.9, 0.05, 0.05], &[0.0, 1.0, 0.0]);
        assert!((good - -(0.9f64).ln()).abs() < 1e-9);
        assert!(bad > good);
    }

    #[test]
    fn zero_probability_stays_finite() {
        assert!(CrossEntropyLoss::loss(&[0.0, 1.0], &[1.0, 0.0]).is_finite());
        assert_eq!(CrossEntropyLoss::derivative(&[0.25, 0.75], &[1.0, 0.0]), vec![-0.75, 0.75]);
    }
}
