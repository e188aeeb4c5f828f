use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// The input table lacks a required column (e.g. the clone column)
    MissingColumn(String),
    /// Sequence type other than `aa` or `nt`
    InvalidSeqType(String),
    /// Weighted mode with a weight count different from the layer count
    WeightsLength { expected: usize, found: usize },
    /// Negative or non-finite layer weight
    InvalidWeight(f64),
    /// `min_size` below 2
    InvalidMinSize(usize),
    /// Fixed layout nodes without an initial position
    FixedWithoutPosition(String),
    /// Degree requested before any distance matrix exists
    MissingDistance,
    /// Malformed input row or field
    ParseError { line: usize, message: String },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::MissingColumn(col) => write!(
                f,
                "Data does not contain column '{}'. Clones must be assigned first",
                col
            ),
            NetworkError::InvalidSeqType(s) => write!(
                f,
                "Sequence type '{}' is not one of 'aa' or 'nt'",
                s
            ),
            NetworkError::WeightsLength { expected, found } => write!(
                f,
                "Length of provided weights should be {}, got {}",
                expected, found
            ),
            NetworkError::InvalidWeight(w) => {
                write!(f, "Layer weights must be non-negative, got {}", w)
            }
            NetworkError::InvalidMinSize(n) => {
                write!(f, "min_size must be at least 2, got {}", n)
            }
            NetworkError::FixedWithoutPosition(node) => {
                write!(f, "Node '{}' is fixed without a position given", node)
            }
            NetworkError::MissingDistance => write!(
                f,
                "No distance matrices available. Generate the network first"
            ),
            NetworkError::ParseError { line, message } => {
                write!(f, "Parse error at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for NetworkError {}
