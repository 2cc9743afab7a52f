use crate::train::epoch_stats::EpochStats;

fn percent(fraction: f64) -> String {
    format!("{:>6.2}%", fraction * 100.0)
}

/// Prints every `every`-th epoch (and the last one) as a table row.
pub fn print_epoch_table(history: &[EpochStats], every: usize) {
    let every = every.max(1);
    println!("{:>6}  {:>10}  {:>9}  {:>10}  {:>9}  {:>8}", "Epoch", "Loss", "Train Acc", "Val Loss", "Val Acc", "ms");
    println!("{}", "─".repeat(62));
    for s in history.iter().filter(|s| s.epoch % every == 0 || s.epoch == s.total_epochs) {
        println!(
            "{:>6}  {:>10.6}  {:>9}  {:>10}  {:>9}  {:>8}",
            s.epoch,
            s.train_loss,
            percent(s.train_accuracy),
            s.val_loss.map_or_else(|| "-".to_string(), |v| format!("{v:.6}")),
            s.val_accuracy.map_or_else(|| "-".to_string(), percent),
            s.elapsed_ms,
        );
    }
}

/// Row-normalized confusion matrix: each row shows, for one true class, the
/// share of samples assigned to each predicted class.
pub fn normalize_rows(matrix: &[Vec<usize>]) -> Vec<Vec<f64>> {
    matrix.iter()
        .map(|row| {
            let total: usize = row.iter().sum();
            row.iter()
                .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
                .collect()
        })
        .collect()
}

pub fn print_confusion(matrix: &[Vec<usize>], labels: &[String]) {
    let width = labels.iter().map(|l| l.len()).max().unwrap_or(4).clamp(4, 12);
    let short = |l: &str| l.chars().take(width).collect::<String>();

    println!("\nConfusion matrix (rows = truth, columns = prediction, row-normalized):");
    print!("{:>width$}", "");
    for label in labels {
        print!(" {:>6}", label.chars().take(6).collect::<String>());
    }
    println!();
    for (label, row) in labels.iter().zip(normalize_rows(matrix)) {
        print!("{:>width$}", short(label));
        for v in row {
            print!(" {:>6.2}", v);
        }
        println!();
    }
}

/// Prints `(input description, truth, prediction)` rows.
pub fn print_predictions(rows: &[(String, String, String)]) {
    let width = rows.iter().map(|r| r.0.len()).max().unwrap_or(5).max(5);
    println!("{:>width$}  {:>12}  {:>12}", "Input", "Truth", "Predicted");
    println!("{}", "-".repeat(width + 28));
    for (input, truth, predicted) in rows {
        let mark = if truth == predicted { "" } else { "  ✗" };
        println!("{:>width$}  {:>12}  {:>12}{}", input, truth, predicted, mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_normalize_and_empty_rows_stay_zero() {
        let m = normalize_rows(&[vec![1, 3], vec![0, 0]]);
        assert_eq!(m, vec![vec![0.25, 0.75], vec![0.0, 0.0]]);
    }
}
