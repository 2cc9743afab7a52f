pub mod plot;
pub mod table;

pub use plot::{plot_loss_curve, plot_moons};
pub use table::{normalize_rows, print_confusion, print_epoch_table, print_predictions};
