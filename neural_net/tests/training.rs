use ndarray::Array2;
use neural_net::{Network, TrainConfig, accuracy, one_hot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_batch<R: Rng>(features: usize, samples: usize, rng: &mut R) -> Array2<f32> {
    Array2::from_shape_simple_fn((features, samples), || rng.random_range(0.0..1.0))
}

#[test]
fn initialization_produces_expected_shapes_and_ranges() {
    let mut rng = StdRng::seed_from_u64(42);
    let sizes = [4, 6, 5, 3];
    let net = Network::new(&sizes, &mut rng).unwrap();

    assert_eq!(net.layer_sizes(), &sizes);
    assert_eq!(net.classes(), 3);

    for (i, (w, b)) in net.weights().iter().zip(net.biases()).enumerate() {
        assert_eq!(w.dim(), (sizes[i + 1], sizes[i]));
        assert_eq!(b.dim(), (sizes[i + 1], 1));

        assert!(w.iter().all(|&v| (-0.5..=0.5).contains(&v)));
        assert!(b.iter().all(|&v| (-0.5..=0.5).contains(&v)));
    }
}

#[test]
fn initialization_is_deterministic_under_a_fixed_seed() {
    let mut rng1 = StdRng::seed_from_u64(42);
    let mut rng2 = StdRng::seed_from_u64(42);

    let a = Network::new(&[4, 6, 3], &mut rng1).unwrap();
    let b = Network::new(&[4, 6, 3], &mut rng2).unwrap();

    assert_eq!(a.weights(), b.weights());
    assert_eq!(a.biases(), b.biases());
}

#[test]
fn forward_output_columns_are_probability_distributions() {
    let mut rng = StdRng::seed_from_u64(1);
    let net = Network::new(&[5, 8, 4], &mut rng).unwrap();
    let x = random_batch(5, 12, &mut rng);

    let pass = net.forward(x.view()).unwrap();
    let output = pass.output();

    assert_eq!(output.dim(), (4, 12));
    for col in output.columns() {
        let sum: f32 = col.sum();
        assert!((sum - 1.0).abs() < 1e-5, "column sums to {sum}");
        assert!(col.iter().all(|&p| p >= 0.0));
    }
}

#[test]
fn forward_is_a_pure_function_of_the_parameters() {
    let mut rng = StdRng::seed_from_u64(2);
    let net = Network::new(&[5, 8, 4], &mut rng).unwrap();
    let x = random_batch(5, 7, &mut rng);

    let first = net.forward(x.view()).unwrap();
    let second = net.forward(x.view()).unwrap();

    assert_eq!(first.output(), second.output());
    assert_eq!(
        net.predict(x.view()).unwrap(),
        net.predict(x.view()).unwrap()
    );
}

#[test]
fn predict_returns_the_argmax_class_per_column() {
    let mut rng = StdRng::seed_from_u64(3);
    let net = Network::new(&[6, 9, 5], &mut rng).unwrap();
    let x = random_batch(6, 20, &mut rng);

    let pass = net.forward(x.view()).unwrap();
    let predictions = net.predict(x.view()).unwrap();

    assert_eq!(predictions.len(), 20);
    for (j, &class) in predictions.iter().enumerate() {
        assert!(class < 5);

        let column = pass.output().column(j);
        assert!(column.iter().all(|&p| p <= column[class]));
    }
}

#[test]
fn one_training_step_decreases_the_loss() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut net = Network::new(&[6, 8, 4], &mut rng).unwrap();

    let x = random_batch(6, 32, &mut rng);
    let labels: Vec<usize> = (0..32).map(|j| j % 4).collect();
    let targets = one_hot(&labels, 4).unwrap();

    let before = net.forward(x.view()).unwrap();
    let grads = net.backward(&before, &targets).unwrap();
    net.update_parameters(&grads, 0.1);
    let after = net.forward(x.view()).unwrap();

    assert!(
        after.loss(&targets) < before.loss(&targets),
        "loss went from {} to {}",
        before.loss(&targets),
        after.loss(&targets)
    );
}

#[test]
fn overridden_parameters_reproduce_the_source_predictions() {
    let mut rng = StdRng::seed_from_u64(5);
    let source = Network::new(&[8, 10, 6, 3], &mut rng).unwrap();
    let mut target = Network::new(&[8, 10, 6, 3], &mut rng).unwrap();

    let x = random_batch(8, 40, &mut rng);

    target
        .set_parameters(source.weights().to_vec(), source.biases().to_vec())
        .unwrap();

    assert_eq!(
        source.predict(x.view()).unwrap(),
        target.predict(x.view()).unwrap()
    );
}

#[test]
fn training_rejects_mismatched_label_counts() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut net = Network::new(&[4, 5, 3], &mut rng).unwrap();
    let x = random_batch(4, 10, &mut rng);

    let res = net.train(x.view(), &[0, 1, 2], &TrainConfig::new(0.1, 1), None);
    assert!(res.is_err());
}

/// End-to-end wiring check: a seeded (784, 256, 10) network trained on
/// synthetic, cleanly separable clusters must end up far above chance on its
/// own training batch.
#[test]
fn training_learns_separable_clusters() {
    let mut rng = StdRng::seed_from_u64(1234);

    let features = 784;
    let classes = 10;
    let per_class = 5;
    let samples = classes * per_class;
    let block = features / classes;

    // Class k activates feature block k; blocks are disjoint across classes.
    let mut x = Array2::zeros((features, samples));
    let mut labels = Vec::with_capacity(samples);

    for j in 0..samples {
        let class = j / per_class;
        labels.push(class);

        for f in class * block..(class + 1) * block {
            x[[f, j]] = 1.0 - rng.random_range(0.0..0.2);
        }
    }

    let mut net = Network::new(&[features, 256, classes], &mut rng).unwrap();

    let targets = one_hot(&labels, classes).unwrap();
    let initial = net.forward(x.view()).unwrap().loss(&targets);

    net.train(x.view(), &labels, &TrainConfig::new(0.25, 150), None)
        .unwrap();

    let final_loss = net.forward(x.view()).unwrap().loss(&targets);
    assert!(final_loss < initial, "loss went from {initial} to {final_loss}");

    let acc = accuracy(&net.predict(x.view()).unwrap(), &labels);
    assert!(acc > 0.5, "training accuracy only reached {:.2}%", acc * 100.0);
}
