use std::{env, io};

use log::info;
use mnist_data::{MnistData, Partition};
use neural_net::{Network, TrainConfig, accuracy};
use rand::SeedableRng;
use rand::rngs::StdRng;

const DEFAULT_EPOCHS: usize = 250;
const DEFAULT_LEARNING_RATE: f32 = 0.25;
const HIDDEN_SIZE: usize = 256;
const CLASSES: usize = 10;

/// Trains a digit classifier with full-batch gradient descent.
///
/// Usage: `digits [epochs] [learning_rate]`. The dataset directory comes
/// from `MNIST_DIR` (default `data`); set `SEED` for a reproducible run.
fn main() -> io::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let epochs = match args.next() {
        Some(arg) => arg.parse().map_err(io::Error::other)?,
        None => DEFAULT_EPOCHS,
    };
    let learning_rate = match args.next() {
        Some(arg) => arg.parse().map_err(io::Error::other)?,
        None => DEFAULT_LEARNING_RATE,
    };

    let data_dir = env::var("MNIST_DIR").unwrap_or_else(|_| "data".to_string());
    let data = MnistData::load(&data_dir)?;

    let (x_train, y_train) = data.normalized_batch(data.train_len(), Partition::Train)?;
    let (x_test, y_test) = data.normalized_batch(data.test_len(), Partition::Test)?;

    let mut rng = match env::var("SEED") {
        Ok(seed) => StdRng::seed_from_u64(seed.parse().map_err(io::Error::other)?),
        Err(_) => StdRng::from_os_rng(),
    };

    let mut network = Network::new(&[x_train.nrows(), HIDDEN_SIZE, CLASSES], &mut rng)?;
    info!("training for {epochs} epochs at learning rate {learning_rate}");

    let config = TrainConfig::new(learning_rate, epochs);
    network.train(
        x_train.view(),
        &y_train,
        &config,
        Some((x_test.view(), &y_test)),
    )?;

    let train_acc = accuracy(&network.predict(x_train.view())?, &y_train);
    let test_acc = accuracy(&network.predict(x_test.view())?, &y_test);

    info!("accuracy with training data: {:.2}%", train_acc * 100.0);
    info!("accuracy with test data: {:.2}%", test_acc * 100.0);

    Ok(())
}
