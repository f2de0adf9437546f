pub mod disk;

pub use disk::collector::{discover, measure_all, measure_path};
pub use disk::types::{Dimension, Measurement};
