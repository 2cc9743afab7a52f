/// Mean squared error, for a Sigmoid or Identity output.
pub struct MseLoss;

impl MseLoss {
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len().max(1) as f64;
        predicted.iter().zip(expected)
            .map(|(p, y)| (p - y) * (p - y))
            .sum::<f64>() / n
    }

    /// Residual `p - y` per output. The 2/n factor of the exact gradient is
    /// folded into the learning rate.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected).map(|(p, y)| p - y).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_squared_errors() {
        assert_eq!(MseLoss::loss(&[1.0, 3.0], &[0.0, 1.0]), 2.5);
        assert_eq!(MseLoss::derivative(&[1.0, 3.0], &[0.0, 1.0]), vec![1.0, 2.0]);
    }
}
