use std::{error::Error, fmt, io};

/// The dataset module's result type.
pub type Result<T> = std::result::Result<T, DataErr>;

/// Errors produced while loading or slicing the digit dataset.
#[derive(Debug)]
pub enum DataErr {
    Io(io::Error),

    /// A file does not start with the magic number its kind requires.
    BadMagic {
        file: &'static str,
        got: u32,
        expected: u32,
    },

    /// A split's image and label files disagree on the sample count.
    CountMismatch {
        file: &'static str,
        images: usize,
        labels: usize,
    },

    /// The two splits disagree on the image geometry.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// More samples were requested than the split holds.
    NotEnoughSamples { requested: usize, available: usize },
}

impl fmt::Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::Io(e) => write!(f, "io error: {e}"),
            DataErr::BadMagic {
                file,
                got,
                expected,
            } => {
                write!(f, "bad magic number in {file}: got {got}, expected {expected}")
            }
            DataErr::CountMismatch {
                file,
                images,
                labels,
            } => {
                write!(f, "{file}: {images} images but {labels} labels")
            }
            DataErr::DimensionMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "dimension mismatch for {what}: got {got}, expected {expected}")
            }
            DataErr::NotEnoughSamples {
                requested,
                available,
            } => {
                write!(
                    f,
                    "requested {requested} samples but the split holds {available}"
                )
            }
        }
    }
}

impl Error for DataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DataErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<DataErr> for io::Error {
    fn from(value: DataErr) -> Self {
        match value {
            DataErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
