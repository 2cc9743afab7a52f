use serde::{Deserialize, Serialize};

/// Describes how to interpret the input fed to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// Plain feature vector of fixed width.
    Numeric { features: usize },
    /// One-hot encoded characters drawn from `alphabet`.
    CharSequence { alphabet: String },
    /// RGB image resized to width×height, normalized to [0, 1], channel-first.
    ImageRgb { width: u32, height: u32 },
}

/// Optional annotations attached to a saved model.
/// All fields are Option<> so checkpoints without metadata deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    pub input_type: Option<InputType>,
    /// Human-readable class labels for the output layer.
    pub output_labels: Option<Vec<String>>,
}
