use ndarray::ShapeError;
use ndarray_npy::{ReadNpyError, ReadNpzError, WriteNpzError};
use std::io;
use thiserror::Error;

/// Errors raised while decoding or encoding the array-oriented feature formats.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to read .npy data: {0}")]
    Npy(#[from] ReadNpyError),
    #[error("Failed to read .npz archive: {0}")]
    NpzRead(#[from] ReadNpzError),
    #[error("Failed to write .npz archive: {0}")]
    NpzWrite(#[from] WriteNpzError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Pickle decoding error: {0}")]
    Pickle(#[from] serde_pickle::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Expected a {expected}-dimensional array, found {found} dimensions")]
    Dimensionality { expected: usize, found: usize },
    #[error("Matrix of shape ({rows}, {cols}) cannot be squeezed to a vector")]
    Squeeze { rows: usize, cols: usize },
    #[error("Inconsistent array shapes: {0}")]
    Shape(#[from] ShapeError),
    #[error("Malformed data: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("Invalid float value '{value}' in column {column}")]
    InvalidFloat { column: usize, value: String },
    #[error("Row has {found} values, expected {expected}")]
    RaggedRow { expected: usize, found: usize },
}
