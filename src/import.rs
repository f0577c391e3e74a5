//! Reading parameters exported by an external training pipeline.
//!
//! The exporting side writes one comma-delimited text file per weight
//! matrix (`weights_1.txt`, `weights_2.txt`, ...) and per bias vector
//! (`biases_1.txt`, ...), numbered from 1. Exported weight matrices are
//! input-major, `(inputs, outputs)`, and are transposed here into the
//! engine's output-major layout. Bias files hold one value per line and
//! are read directly as `(outputs, 1)` columns; no bias transpose path
//! exists.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use ndarray::Array2;

/// The import module's result type.
pub type Result<T> = std::result::Result<T, ImportErr>;

/// Errors produced while reading exported parameter files.
#[derive(Debug)]
pub enum ImportErr {
    Io(io::Error),

    /// A record could not be read or parsed as floats.
    Csv(csv::Error),

    /// A row has a different number of values than the first row.
    Ragged {
        row: usize,
        got: usize,
        expected: usize,
    },

    /// The file holds no values at all.
    Empty { file: PathBuf },
}

impl std::fmt::Display for ImportErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportErr::Io(e) => write!(f, "io error: {e}"),
            ImportErr::Csv(e) => write!(f, "malformed parameter file: {e}"),
            ImportErr::Ragged { row, got, expected } => {
                write!(f, "row {row} holds {got} values, expected {expected}")
            }
            ImportErr::Empty { file } => {
                write!(f, "parameter file {} is empty", file.display())
            }
        }
    }
}

impl std::error::Error for ImportErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportErr::Io(e) => Some(e),
            ImportErr::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ImportErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ImportErr {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<ImportErr> for io::Error {
    fn from(value: ImportErr) -> Self {
        match value {
            ImportErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// Reads one comma-delimited, headerless text file into a matrix.
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(File::open(path)?);

    let mut values = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for (i, record) in reader.deserialize::<Vec<f32>>().enumerate() {
        let row = record?;

        match cols {
            None => cols = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(ImportErr::Ragged {
                    row: i,
                    got: row.len(),
                    expected,
                });
            }
            Some(_) => {}
        }

        rows += 1;
        values.extend(row);
    }

    let Some(cols) = cols else {
        return Err(ImportErr::Empty {
            file: path.to_owned(),
        });
    };

    Ok(Array2::from_shape_vec((rows, cols), values).expect("row lengths already checked"))
}

/// Loads every exported layer from `dir`, engine-ready.
///
/// Walks `weights_1.txt, weights_2.txt, ...` until a file is missing.
/// Weight matrices come back output-major, bias vectors as columns; shape
/// coherence across the chain is left to `Network::set_parameters`.
pub fn load_exported<P: AsRef<Path>>(dir: P) -> Result<(Vec<Array2<f32>>, Vec<Array2<f32>>)> {
    let dir = dir.as_ref();
    let mut weights = Vec::new();
    let mut biases = Vec::new();

    for i in 1.. {
        let weight_path = dir.join(format!("weights_{i}.txt"));
        if !weight_path.exists() {
            break;
        }

        weights.push(read_matrix(&weight_path)?.reversed_axes());
        biases.push(read_matrix(dir.join(format!("biases_{i}.txt")))?);
    }

    if weights.is_empty() {
        return Err(ImportErr::Empty {
            file: dir.join("weights_1.txt"),
        });
    }

    Ok((weights, biases))
}

/// Layer widths implied by a chain of engine-ready weight matrices.
pub fn layer_sizes(weights: &[Array2<f32>]) -> Vec<usize> {
    let Some(first) = weights.first() else {
        return Vec::new();
    };

    let mut sizes = vec![first.ncols()];
    sizes.extend(weights.iter().map(|w| w.nrows()));
    sizes
}
