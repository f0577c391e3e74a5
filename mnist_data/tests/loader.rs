//! Loader tests against synthetic gzip-compressed IDX fixtures.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use mnist_data::{DataErr, MnistData, Partition};

const ROWS: u32 = 2;
const COLS: u32 = 2;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("mnist_data_tests")
        .join(format!("{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_gz(path: &Path, bytes: &[u8]) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(bytes).unwrap();
    enc.finish().unwrap();
}

fn label_file(magic: u32, labels: &[u8]) -> Vec<u8> {
    let mut bytes = magic.to_be_bytes().to_vec();
    bytes.extend((labels.len() as u32).to_be_bytes());
    bytes.extend(labels);
    bytes
}

fn image_file(magic: u32, images: &[[u8; 4]]) -> Vec<u8> {
    let mut bytes = magic.to_be_bytes().to_vec();
    bytes.extend((images.len() as u32).to_be_bytes());
    bytes.extend(ROWS.to_be_bytes());
    bytes.extend(COLS.to_be_bytes());
    for image in images {
        bytes.extend(image);
    }
    bytes
}

/// Writes a coherent two-split fixture: three training samples, two test
/// samples, 2x2 pixels each.
fn write_fixture(dir: &Path) {
    write_gz(
        &dir.join("train-images-idx3-ubyte.gz"),
        &image_file(2051, &[[0, 51, 102, 153], [255, 0, 0, 0], [10, 20, 30, 40]]),
    );
    write_gz(
        &dir.join("train-labels-idx1-ubyte.gz"),
        &label_file(2049, &[7, 0, 9]),
    );
    write_gz(
        &dir.join("t10k-images-idx3-ubyte.gz"),
        &image_file(2051, &[[255, 255, 255, 255], [0, 0, 0, 255]]),
    );
    write_gz(
        &dir.join("t10k-labels-idx1-ubyte.gz"),
        &label_file(2049, &[1, 2]),
    );
}

#[test]
fn loads_and_normalizes_both_splits() {
    let dir = fixture_dir("loads");
    write_fixture(&dir);

    let data = MnistData::load(&dir).unwrap();
    assert_eq!(data.rows(), 2);
    assert_eq!(data.cols(), 2);
    assert_eq!(data.train_len(), 3);
    assert_eq!(data.test_len(), 2);

    let (x, y) = data.normalized_batch(3, Partition::Train).unwrap();
    assert_eq!(x.dim(), (4, 3));
    assert_eq!(y, vec![7, 0, 9]);

    // First image flattens row-major into the first column, scaled by 255.
    assert_eq!(x[[0, 0]], 0.0);
    assert!((x[[1, 0]] - 51.0 / 255.0).abs() < 1e-6);
    assert!((x[[2, 0]] - 102.0 / 255.0).abs() < 1e-6);
    assert!((x[[3, 0]] - 153.0 / 255.0).abs() < 1e-6);
    assert_eq!(x[[0, 1]], 1.0);

    let (x, y) = data.normalized_batch(1, Partition::Test).unwrap();
    assert_eq!(x.dim(), (4, 1));
    assert!(x.iter().all(|&p| p == 1.0));
    assert_eq!(y, vec![1]);
}

#[test]
fn rejects_oversized_batch_requests() {
    let dir = fixture_dir("oversized");
    write_fixture(&dir);

    let data = MnistData::load(&dir).unwrap();
    let err = data.normalized_batch(4, Partition::Train).unwrap_err();

    assert!(matches!(
        err,
        DataErr::NotEnoughSamples {
            requested: 4,
            available: 3
        }
    ));
}

#[test]
fn rejects_label_file_posing_as_images() {
    let dir = fixture_dir("bad_magic");
    write_fixture(&dir);

    // Overwrite the training image file with a label-file magic number.
    write_gz(
        &dir.join("train-images-idx3-ubyte.gz"),
        &image_file(2049, &[[0, 0, 0, 0]]),
    );

    let err = MnistData::load(&dir).unwrap_err();
    assert!(matches!(
        err,
        DataErr::BadMagic {
            got: 2049,
            expected: 2051,
            ..
        }
    ));
}

#[test]
fn rejects_mismatched_image_and_label_counts() {
    let dir = fixture_dir("count_mismatch");
    write_fixture(&dir);

    write_gz(
        &dir.join("train-labels-idx1-ubyte.gz"),
        &label_file(2049, &[7, 0]),
    );

    let err = MnistData::load(&dir).unwrap_err();
    assert!(matches!(
        err,
        DataErr::CountMismatch {
            images: 3,
            labels: 2,
            ..
        }
    ));
}

#[test]
fn missing_files_surface_as_io_errors() {
    let dir = fixture_dir("missing");

    let err = MnistData::load(&dir).unwrap_err();
    assert!(matches!(err, DataErr::Io(_)));
}
