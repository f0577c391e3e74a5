use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;
use log::info;
use ndarray::Array2;

use crate::error::{DataErr, Result};
use crate::idx::{read_image_file, read_label_file};

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte.gz";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte.gz";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte.gz";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte.gz";

const PIXEL_MAX: f32 = 255.0;

/// Which split of the dataset to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Train,
    Test,
}

#[derive(Debug)]
struct Split {
    pixels: Vec<u8>,
    labels: Vec<u8>,
    count: usize,
}

/// The handwritten-digit dataset, loaded fully into memory.
///
/// Expects the four gzip-compressed IDX files of the reference
/// distribution (`train-images-idx3-ubyte.gz` and friends) in one
/// directory. Training and test splits are parsed and cross-checked at
/// load time; batches are sliced out afterwards without further I/O.
#[derive(Debug)]
pub struct MnistData {
    rows: usize,
    cols: usize,
    train: Split,
    test: Split,
}

impl MnistData {
    /// Loads and validates both splits from `dir`.
    ///
    /// # Errors
    /// `DataErr::BadMagic` for files of the wrong kind, `CountMismatch`
    /// when a split's image and label files disagree, `DimensionMismatch`
    /// when the test geometry differs from the training geometry, and
    /// `Io` for anything the filesystem or the gzip stream reports.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let train_images = read_image_file(gz_reader(&dir.join(TRAIN_IMAGES))?, TRAIN_IMAGES)?;
        let train_labels = read_label_file(gz_reader(&dir.join(TRAIN_LABELS))?, TRAIN_LABELS)?;
        let test_images = read_image_file(gz_reader(&dir.join(TEST_IMAGES))?, TEST_IMAGES)?;
        let test_labels = read_label_file(gz_reader(&dir.join(TEST_LABELS))?, TEST_LABELS)?;

        if train_images.count != train_labels.len() {
            return Err(DataErr::CountMismatch {
                file: TRAIN_IMAGES,
                images: train_images.count,
                labels: train_labels.len(),
            });
        }

        if test_images.count != test_labels.len() {
            return Err(DataErr::CountMismatch {
                file: TEST_IMAGES,
                images: test_images.count,
                labels: test_labels.len(),
            });
        }

        if test_images.rows != train_images.rows {
            return Err(DataErr::DimensionMismatch {
                what: "test image rows",
                got: test_images.rows,
                expected: train_images.rows,
            });
        }

        if test_images.cols != train_images.cols {
            return Err(DataErr::DimensionMismatch {
                what: "test image columns",
                got: test_images.cols,
                expected: train_images.cols,
            });
        }

        info!(
            "loaded {} training and {} test samples of {}x{} pixels",
            train_images.count, test_images.count, train_images.rows, train_images.cols
        );

        Ok(Self {
            rows: train_images.rows,
            cols: train_images.cols,
            train: Split {
                pixels: train_images.pixels,
                labels: train_labels,
                count: train_images.count,
            },
            test: Split {
                pixels: test_images.pixels,
                labels: test_labels,
                count: test_images.count,
            },
        })
    }

    /// Image height in pixels.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Image width in pixels.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of samples in the training split.
    pub fn train_len(&self) -> usize {
        self.train.count
    }

    /// Number of samples in the test split.
    pub fn test_len(&self) -> usize {
        self.test.count
    }

    /// Slices the first `samples` items of a split into a training batch.
    ///
    /// Pixels are scaled to `[0, 1]` and every image is flattened row-major
    /// into one column, so the feature matrix comes out `(rows * cols,
    /// samples)` with the label vector alongside.
    pub fn normalized_batch(
        &self,
        samples: usize,
        partition: Partition,
    ) -> Result<(Array2<f32>, Vec<usize>)> {
        let split = match partition {
            Partition::Train => &self.train,
            Partition::Test => &self.test,
        };

        if samples > split.count {
            return Err(DataErr::NotEnoughSamples {
                requested: samples,
                available: split.count,
            });
        }

        let features = self.rows * self.cols;
        let x = Array2::from_shape_fn((features, samples), |(f, j)| {
            split.pixels[j * features + f] as f32 / PIXEL_MAX
        });
        let y = split.labels[..samples].iter().map(|&l| l as usize).collect();

        Ok((x, y))
    }
}

fn gz_reader(path: &Path) -> Result<GzDecoder<File>> {
    Ok(GzDecoder::new(File::open(path)?))
}
