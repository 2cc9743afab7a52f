pub mod checkpoint;
pub mod metadata;
pub mod network;
pub mod spec;

pub use checkpoint::Checkpoint;
pub use metadata::{InputType, ModelMetadata};
pub use network::Network;
pub use spec::{NetworkSpec, LayerSpec};
