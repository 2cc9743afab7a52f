pub mod ages;
pub mod csv;
pub mod image;
pub mod moons;
pub mod names;
pub mod split;

pub use ages::{AgeGroup, ImageTensorSet};
pub use moons::{make_moons, MoonsDataset};
pub use names::{line_to_sequence, unicode_to_ascii, NameCorpus, ALL_LETTERS, N_LETTERS};
pub use split::{one_hot, train_test_split};
