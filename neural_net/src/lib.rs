mod activations;
mod config;
mod error;
mod network;

pub use config::TrainConfig;
pub use error::{NetErr, Result};
pub use network::{ForwardPass, Gradients, Network, accuracy, one_hot};
