/// Binary cross-entropy for a single Sigmoid output unit (target 0 or 1).
pub struct BceLoss;

/// Keeps both logarithms finite when the sigmoid saturates.
const EPS: f64 = 1e-12;

impl BceLoss {
    /// `-mean(y·ln(p) + (1 - y)·ln(1 - p))`
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len().max(1) as f64;
        let total: f64 = predicted.iter().zip(expected)
            .map(|(&p, &y)| y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln())
            .sum();
        -total / n
    }

    /// ∂L/∂p, for a head whose activation derivative is applied separately.
    /// Saturated outputs (p exactly 0 or 1) lose the gradient here; use
    /// `logit_derivative` when the head is a Sigmoid.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected)
            .map(|(&p, &y)| (p - y) / ((p + EPS) * (1.0 - p + EPS)))
            .collect()
    }

    /// ∂L/∂z for `p = sigmoid(z)`: the σ' factor cancels and leaves `p - y`.
    pub fn logit_derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected).map(|(p, y)| p - y).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_times_sigmoid_slope_is_residual() {
        let p = 0.7;
        let g = BceLoss::derivative(&[p], &[1.0])[0];
        assert!((g * p * (1.0 - p) - (p - 1.0)).abs() < 1e-9);
        assert!((BceLoss::loss(&[0.5], &[1.0]) - std::f64::consts::LN_2).abs() < 1e-9);
    }

    #[test]
    fn logit_gradient_survives_saturation() {
        assert_eq!(BceLoss::logit_derivative(&[1.0, 0.0], &[0.0, 1.0]), vec![1.0, -1.0]);
    }
}
