mod dataset;
mod error;
mod idx;

pub use dataset::{MnistData, Partition};
pub use error::{DataErr, Result};
