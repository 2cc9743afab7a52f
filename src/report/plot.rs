use textplots::{Chart, Plot, Shape};

use crate::train::epoch_stats::EpochStats;

const CHART_WIDTH: u32 = 120;
const CHART_HEIGHT: u32 = 48;

/// Terminal line chart of loss per epoch (training, and validation if any).
pub fn plot_loss_curve(history: &[EpochStats]) {
    if history.is_empty() {
        return;
    }
    let train: Vec<(f32, f32)> = history.iter()
        .map(|s| (s.epoch as f32, s.train_loss as f32))
        .collect();
    let val: Vec<(f32, f32)> = history.iter()
        .filter_map(|s| s.val_loss.map(|v| (s.epoch as f32, v as f32)))
        .collect();
    let x_max = history.len().max(2) as f32;

    println!("\nLoss per epoch (training{}):", if val.is_empty() { "" } else { " and validation" });
    if val.is_empty() {
        Chart::new(CHART_WIDTH, CHART_HEIGHT, 1.0, x_max)
            .lineplot(&Shape::Lines(&train))
            .display();
    } else {
        Chart::new(CHART_WIDTH, CHART_HEIGHT, 1.0, x_max)
            .lineplot(&Shape::Lines(&train))
            .lineplot(&Shape::Lines(&val))
            .display();
    }
}

/// Terminal scatter of 2-D points split by predicted class (0 and 1).
pub fn plot_moons(points: &[[f64; 2]], classes: &[usize]) {
    let split = |class: usize| -> Vec<(f32, f32)> {
        points.iter().zip(classes)
            .filter(|(_, &c)| c == class)
            .map(|(p, _)| (p[0] as f32, p[1] as f32))
            .collect()
    };
    let first = split(0);
    let second = split(1);
    let (x_min, x_max) = points.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if !x_min.is_finite() || !x_max.is_finite() {
        return;
    }

    println!("\nPredicted classes ({} vs {} points):", first.len(), second.len());
    Chart::new(CHART_WIDTH, CHART_HEIGHT, x_min as f32 - 0.1, x_max as f32 + 0.1)
        .lineplot(&Shape::Points(&first))
        .lineplot(&Shape::Points(&second))
        .display();
}
