use std::{env, io};

use digits::import;
use log::info;
use mnist_data::{MnistData, Partition};
use neural_net::{Network, accuracy};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Evaluates parameters trained by an external pipeline.
///
/// Reads the exported `weights_{i}.txt` / `biases_{i}.txt` files from
/// `PARAMS_DIR` (default `params`), installs them into a freshly built
/// network, and cross-checks prediction accuracy on the test split from
/// `MNIST_DIR` (default `data`).
fn main() -> io::Result<()> {
    env_logger::init();

    let params_dir = env::var("PARAMS_DIR").unwrap_or_else(|_| "params".to_string());
    let data_dir = env::var("MNIST_DIR").unwrap_or_else(|_| "data".to_string());

    let (weights, biases) = import::load_exported(&params_dir)?;
    let sizes = import::layer_sizes(&weights);
    info!("imported parameters for layers {sizes:?}");

    // The random initialization is overwritten wholesale.
    let mut rng = StdRng::seed_from_u64(0);
    let mut network = Network::new(&sizes, &mut rng)?;
    network.set_parameters(weights, biases)?;

    let data = MnistData::load(&data_dir)?;
    let (x_test, y_test) = data.normalized_batch(data.test_len(), Partition::Test)?;
    let predictions = network.predict(x_test.view())?;

    info!(
        "accuracy with test data: {:.2}%",
        accuracy(&predictions, &y_test) * 100.0
    );

    Ok(())
}
