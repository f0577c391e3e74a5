use log::info;
use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;

use crate::activations::{relu, relu_prime, softmax};
use crate::config::TrainConfig;
use crate::error::{NetErr, Result};

/// Epoch interval between accuracy reports during training.
const REPORT_INTERVAL: usize = 5;

/// A feed-forward network with ReLU hidden layers and a softmax output layer.
///
/// The network owns one weight matrix of shape `(outputs, inputs)` and one
/// bias column of shape `(outputs, 1)` per layer transition. Parameters are
/// only mutated by [`Network::update_parameters`] and
/// [`Network::set_parameters`]; everything else is a pure function of the
/// current parameters.
pub struct Network {
    layer_sizes: Vec<usize>,
    weights: Vec<Array2<f32>>,
    biases: Vec<Array2<f32>>,
}

/// Activation cache produced by one forward pass.
///
/// Holds `A[0..=L]` (the input batch followed by every post-activation
/// output) and `Z[0..L]` (the pre-activations). [`Network::backward`]
/// consumes this cache instead of recomputing it.
pub struct ForwardPass {
    activations: Vec<Array2<f32>>,
    pre_activations: Vec<Array2<f32>>,
}

impl ForwardPass {
    /// Returns the output layer activation, one probability column per sample.
    pub fn output(&self) -> &Array2<f32> {
        &self.activations[self.activations.len() - 1]
    }

    /// Training loss of this pass against a one-hot target matrix.
    ///
    /// Computes `(2/m) * sum(-ln A[label, j])`, twice the mean per-sample
    /// cross-entropy of the softmax outputs. The backward pass's output rule
    /// `dZ = 2 * (A - Y)` is the exact gradient of this scalar, which makes
    /// it the quantity gradient checks and convergence tests measure.
    pub fn loss(&self, targets: &Array2<f32>) -> f32 {
        let output = self.output();
        let samples = output.ncols().max(1) as f32;

        let total: f32 = targets
            .iter()
            .zip(output.iter())
            .filter(|&(&t, _)| t > 0.0)
            .map(|(_, &a)| a.ln())
            .sum();

        -2.0 * total / samples
    }
}

/// Per-transition parameter gradients, shaped exactly like the parameters.
///
/// Only [`Network::backward`] constructs these, so the update step can rely
/// on the shapes without re-checking them.
pub struct Gradients {
    weights: Vec<Array2<f32>>,
    biases: Vec<Array2<f32>>,
}

impl Gradients {
    /// Returns the weight gradients, one matrix per layer transition.
    pub fn weights(&self) -> &[Array2<f32>] {
        &self.weights
    }

    /// Returns the bias gradients, one column per layer transition.
    pub fn biases(&self) -> &[Array2<f32>] {
        &self.biases
    }
}

impl Network {
    /// Creates a network with parameters drawn uniformly from `[-0.5, 0.5]`.
    ///
    /// # Arguments
    /// * `layer_sizes` - Layer widths from input to output, at least two.
    /// * `rng` - The generator used for initialization. Seed it (e.g. with
    ///   `StdRng::seed_from_u64`) for reproducible parameters.
    ///
    /// # Returns
    /// A new `Network`, or `NetErr::InvalidInput` for a degenerate layout.
    pub fn new<R: Rng>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(NetErr::InvalidInput(
                "a network needs an input and an output layer",
            ));
        }

        if layer_sizes.contains(&0) {
            return Err(NetErr::InvalidInput("layer sizes must be positive"));
        }

        let mut weights = Vec::with_capacity(layer_sizes.len() - 1);
        let mut biases = Vec::with_capacity(layer_sizes.len() - 1);

        for pair in layer_sizes.windows(2) {
            let (inputs, outputs) = (pair[0], pair[1]);

            weights.push(Array2::from_shape_simple_fn((outputs, inputs), || {
                rng.random_range(-0.5..0.5)
            }));
            biases.push(Array2::from_shape_simple_fn((outputs, 1), || {
                rng.random_range(-0.5..0.5)
            }));
        }

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            weights,
            biases,
        })
    }

    /// Returns the layer widths from input to output.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Returns the weight matrices, one per layer transition.
    pub fn weights(&self) -> &[Array2<f32>] {
        &self.weights
    }

    /// Returns the bias columns, one per layer transition.
    pub fn biases(&self) -> &[Array2<f32>] {
        &self.biases
    }

    /// Number of output classes.
    pub fn classes(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    fn transitions(&self) -> usize {
        self.layer_sizes.len() - 1
    }

    /// Replaces every parameter wholesale, e.g. with externally trained ones.
    ///
    /// Every matrix is checked against the layer geometry before anything is
    /// assigned, so a mismatch leaves the current parameters untouched.
    ///
    /// # Arguments
    /// * `weights` - One `(outputs, inputs)` matrix per layer transition.
    /// * `biases` - One `(outputs, 1)` column per layer transition.
    pub fn set_parameters(
        &mut self,
        weights: Vec<Array2<f32>>,
        biases: Vec<Array2<f32>>,
    ) -> Result<()> {
        let transitions = self.transitions();

        if weights.len() != transitions {
            return Err(NetErr::DimensionMismatch {
                what: "weight matrices",
                got: weights.len(),
                expected: transitions,
            });
        }

        if biases.len() != transitions {
            return Err(NetErr::DimensionMismatch {
                what: "bias columns",
                got: biases.len(),
                expected: transitions,
            });
        }

        for (i, (w, b)) in weights.iter().zip(&biases).enumerate() {
            let expected = (self.layer_sizes[i + 1], self.layer_sizes[i]);
            if w.dim() != expected {
                return Err(NetErr::ShapeMismatch {
                    what: "weights",
                    got: w.dim(),
                    expected,
                });
            }

            let expected = (self.layer_sizes[i + 1], 1);
            if b.dim() != expected {
                return Err(NetErr::ShapeMismatch {
                    what: "biases",
                    got: b.dim(),
                    expected,
                });
            }
        }

        self.weights = weights;
        self.biases = biases;
        Ok(())
    }

    /// Propagates a batch through the network.
    ///
    /// # Arguments
    /// * `x` - Input batch, `(features, samples)`.
    ///
    /// # Returns
    /// The full activation cache. Its output columns are valid probability
    /// distributions (non-negative, summing to 1) for finite inputs.
    pub fn forward(&self, x: ArrayView2<f32>) -> Result<ForwardPass> {
        if x.nrows() != self.layer_sizes[0] {
            return Err(NetErr::DimensionMismatch {
                what: "input features",
                got: x.nrows(),
                expected: self.layer_sizes[0],
            });
        }

        let transitions = self.transitions();
        let mut activations = Vec::with_capacity(transitions + 1);
        let mut pre_activations = Vec::with_capacity(transitions);
        activations.push(x.to_owned());

        for i in 0..transitions {
            let z = self.weights[i].dot(&activations[i]) + &self.biases[i];
            let a = if i + 1 == transitions {
                softmax(&z)
            } else {
                z.mapv(relu)
            };

            pre_activations.push(z);
            activations.push(a);
        }

        Ok(ForwardPass {
            activations,
            pre_activations,
        })
    }

    /// Computes the parameter gradients for one batch.
    ///
    /// Walks the layers from output to input: `dZ = 2 * (A - Y)` at the
    /// output, then `dZ[i] = W[i+1]^T dZ[i+1] * relu'(Z[i])` below, with
    /// `dW = dZ A^T / m` and `db = rowsum(dZ) / m`.
    ///
    /// # Arguments
    /// * `pass` - The cache from [`Network::forward`] over the same batch and
    ///   the current parameters.
    /// * `targets` - One-hot target matrix, `(classes, samples)`.
    pub fn backward(&self, pass: &ForwardPass, targets: &Array2<f32>) -> Result<Gradients> {
        let output = pass.output();

        if targets.dim() != output.dim() {
            return Err(NetErr::ShapeMismatch {
                what: "targets",
                got: targets.dim(),
                expected: output.dim(),
            });
        }

        let samples = output.ncols();
        if samples == 0 {
            return Err(NetErr::InvalidInput(
                "cannot backpropagate over an empty batch",
            ));
        }

        let scale = 1.0 / samples as f32;
        let transitions = self.transitions();

        let mut weights: Vec<Array2<f32>> = self
            .weights
            .iter()
            .map(|w| Array2::zeros(w.dim()))
            .collect();
        let mut biases: Vec<Array2<f32>> = self
            .biases
            .iter()
            .map(|b| Array2::zeros(b.dim()))
            .collect();

        let mut dz = (output - targets) * 2.0;

        for i in (0..transitions).rev() {
            weights[i] = dz.dot(&pass.activations[i].t()) * scale;
            biases[i] = dz.sum_axis(Axis(1)).insert_axis(Axis(1)) * scale;

            if i > 0 {
                dz = self.weights[i].t().dot(&dz)
                    * pass.pre_activations[i - 1].mapv(relu_prime);
            }
        }

        Ok(Gradients { weights, biases })
    }

    /// Takes one gradient-descent step in place.
    pub fn update_parameters(&mut self, grads: &Gradients, learning_rate: f32) {
        for (w, g) in self.weights.iter_mut().zip(&grads.weights) {
            w.scaled_add(-learning_rate, g);
        }

        for (b, g) in self.biases.iter_mut().zip(&grads.biases) {
            b.scaled_add(-learning_rate, g);
        }
    }

    /// Trains with full-batch gradient descent.
    ///
    /// Runs `config.epochs()` cycles of forward, backward and update over the
    /// whole batch. Every few epochs the classification accuracy is logged,
    /// measured on `holdout` when given and on the training batch otherwise;
    /// the report never influences the parameters.
    ///
    /// # Arguments
    /// * `x` - Training batch, `(features, samples)`.
    /// * `labels` - Class label per sample, each in `[0, classes)`.
    /// * `config` - Learning rate and epoch count.
    /// * `holdout` - Optional held-out batch and labels for progress reports.
    pub fn train(
        &mut self,
        x: ArrayView2<f32>,
        labels: &[usize],
        config: &TrainConfig,
        holdout: Option<(ArrayView2<f32>, &[usize])>,
    ) -> Result<()> {
        if labels.len() != x.ncols() {
            return Err(NetErr::DimensionMismatch {
                what: "training labels",
                got: labels.len(),
                expected: x.ncols(),
            });
        }

        if let Some((hx, hy)) = &holdout {
            if hy.len() != hx.ncols() {
                return Err(NetErr::DimensionMismatch {
                    what: "held-out labels",
                    got: hy.len(),
                    expected: hx.ncols(),
                });
            }
        }

        let targets = one_hot(labels, self.classes())?;
        let epochs = config.epochs();

        for epoch in 1..=epochs {
            let pass = self.forward(x)?;
            let grads = self.backward(&pass, &targets)?;
            self.update_parameters(&grads, config.learning_rate());

            if epoch % REPORT_INTERVAL == 0 {
                let acc = match &holdout {
                    Some((hx, hy)) => accuracy(&self.predict(*hx)?, hy),
                    None => accuracy(&argmax_columns(pass.output()), labels),
                };

                info!("epoch {epoch}/{epochs}: accuracy {:.2}%", acc * 100.0);
            }
        }

        Ok(())
    }

    /// Predicts the class of every sample column as the arg-max output index.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Vec<usize>> {
        let pass = self.forward(x)?;
        Ok(argmax_columns(pass.output()))
    }
}

/// Encodes labels as a one-hot matrix of shape `(classes, samples)`.
///
/// Labels are used as direct row indices, so they must be exactly the
/// integers `0..classes`; anything else is a `LabelOutOfRange` error rather
/// than a silently clamped column.
pub fn one_hot(labels: &[usize], classes: usize) -> Result<Array2<f32>> {
    let mut targets = Array2::zeros((classes, labels.len()));

    for (index, &label) in labels.iter().enumerate() {
        if label >= classes {
            return Err(NetErr::LabelOutOfRange {
                index,
                label,
                classes,
            });
        }

        targets[[label, index]] = 1.0;
    }

    Ok(targets)
}

/// Fraction of predictions that agree with the labels.
pub fn accuracy(predictions: &[usize], labels: &[usize]) -> f32 {
    if labels.is_empty() {
        return 0.0;
    }

    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();

    correct as f32 / labels.len() as f32
}

fn argmax_columns(a: &Array2<f32>) -> Vec<usize> {
    a.columns()
        .into_iter()
        .map(|col| {
            col.iter()
                .enumerate()
                .fold(
                    (0, f32::NEG_INFINITY),
                    |best, (i, &v)| if v > best.1 { (i, v) } else { best },
                )
                .0
        })
        .collect()
}
