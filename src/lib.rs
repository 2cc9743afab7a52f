pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod models;
pub mod loss;
pub mod optim;
pub mod train;
pub mod data;
pub mod report;
pub mod config;
pub mod exercises;
pub mod error;

// Convenience re-exports
pub use math::{matrix::Matrix, tensor::Tensor3};
pub use activation::activation::ActivationFunction;
pub use layers::{conv::Conv2d, dense::Dense, pool::MaxPool2d, recurrent::RnnCell};
pub use network::network::Network;
pub use models::{AgeCnn, CharRnn, Model};
pub use loss::{BceLoss, CrossEntropyLoss, LossType, MseLoss};
pub use optim::{Adam, Optimizer, OptimizerConfig, Parameter, Sgd};
pub use train::{train_loop, TrainConfig};
pub use error::{Error, Result};
