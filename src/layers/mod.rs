pub mod conv;
pub mod dense;
pub mod pool;
pub mod recurrent;

pub use conv::Conv2d;
pub use dense::Dense;
pub use pool::MaxPool2d;
pub use recurrent::RnnCell;
