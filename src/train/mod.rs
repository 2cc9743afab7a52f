pub mod epoch_stats;
pub mod loop_fn;
pub mod metrics;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::EpochStats;
pub use loop_fn::train_loop;
pub use metrics::{accuracy, argmax, confusion_matrix, evaluate_loss, top_k};
pub use train_config::TrainConfig;
pub use trainer::train_sample;
