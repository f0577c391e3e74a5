use std::{error::Error, fmt, io};

/// The network module's result type.
pub type Result<T> = std::result::Result<T, NetErr>;

/// Errors produced by the network when inputs violate its invariants.
#[derive(Debug)]
pub enum NetErr {
    /// An input is invalid for semantic or domain reasons.
    InvalidInput(&'static str),

    /// A one-dimensional size invariant was violated (e.g. mismatched lengths).
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// A matrix does not have the shape the layer geometry requires.
    ShapeMismatch {
        what: &'static str,
        got: (usize, usize),
        expected: (usize, usize),
    },

    /// A class label cannot be encoded as a one-hot column.
    LabelOutOfRange {
        index: usize,
        label: usize,
        classes: usize,
    },
}

impl fmt::Display for NetErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetErr::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            NetErr::DimensionMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "dimension mismatch for {what}: got {got}, expected {expected}")
            }
            NetErr::ShapeMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "shape mismatch for {what}: got {got:?}, expected {expected:?}")
            }
            NetErr::LabelOutOfRange {
                index,
                label,
                classes,
            } => {
                write!(
                    f,
                    "label {label} at sample {index} is outside the {classes} output classes"
                )
            }
        }
    }
}

impl Error for NetErr {}

/// Boundary conversion for binaries / I/O APIs.
impl From<NetErr> for io::Error {
    fn from(value: NetErr) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, value)
    }
}
