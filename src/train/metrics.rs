use crate::{loss::loss_type::LossType, models::Model};

/// Index of the maximum element in a slice (first one on ties, 0 if empty).
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &x)| match best {
            Some((_, b)) if b >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Class predicted from a model output: argmax for multi-class outputs,
/// `output >= 0.5` for a single sigmoid unit.
pub fn predicted_class(output: &[f64]) -> usize {
    if output.len() == 1 {
        usize::from(output[0] >= 0.5)
    } else {
        argmax(output)
    }
}

/// Class encoded by a target vector (one-hot or single 0/1 value).
pub fn target_class(target: &[f64]) -> usize {
    predicted_class(target)
}

/// The `k` most probable classes as `(index, probability)`, best first.
pub fn top_k(probabilities: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);
    ranked
}

/// Fraction of samples classified correctly.
pub fn accuracy<M: Model>(model: &mut M, inputs: &[M::Input], labels: &[Vec<f64>]) -> f64 {
    let n = inputs.len();
    if n == 0 {
        return 0.0;
    }
    let correct = inputs.iter().zip(labels.iter())
        .filter(|(input, label)| predicted_class(&model.forward(input)) == target_class(label))
        .count();
    correct as f64 / n as f64
}

/// Mean loss over a full dataset without gradient accumulation (eval mode).
pub fn evaluate_loss<M: Model>(
    model: &mut M,
    inputs: &[M::Input],
    labels: &[Vec<f64>],
    loss_type: LossType,
) -> f64 {
    let n = inputs.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = inputs.iter().zip(labels.iter())
        .map(|(input, label)| loss_type.loss(&model.forward(input), label))
        .sum();
    total / n as f64
}

/// `matrix[truth][predicted]` counts over the dataset.
pub fn confusion_matrix<M: Model>(
    model: &mut M,
    inputs: &[M::Input],
    labels: &[Vec<f64>],
    n_classes: usize,
) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0usize; n_classes]; n_classes];
    for (input, label) in inputs.iter().zip(labels.iter()) {
        let truth = target_class(label);
        let guess = predicted_class(&model.forward(input));
        if truth < n_classes && guess < n_classes {
            matrix[truth][guess] += 1;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(argmax(&[0.2, 0.7, 0.7, 0.1]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn single_output_uses_threshold() {
        assert_eq!(predicted_class(&[0.49]), 0);
        assert_eq!(predicted_class(&[0.5]), 1);
        assert_eq!(target_class(&[0.0, 1.0, 0.0]), 1);
    }

    #[test]
    fn top_k_is_sorted_and_truncated() {
        let ranked = top_k(&[0.1, 0.6, 0.3], 2);
        assert_eq!(ranked, vec![(1, 0.6), (2, 0.3)]);
        assert_eq!(top_k(&[0.5], 3).len(), 1);
    }
}
