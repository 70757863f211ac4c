use crate::core::chem::SmilesError;
use crate::core::io::FormatError;
use crate::core::io::sdf::SdfError;
use ndarray::ShapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Features path extension {extension} not supported.")]
    UnsupportedExtension { extension: String },

    #[error("Atom descriptors input {path} format not supported")]
    AtomFormatNotSupported { path: String },

    #[error("Atom descriptors path extension {extension} not supported.")]
    UnsupportedAtomExtension { extension: String },

    #[error("Invalid custom atomic descriptors file, Nan found in data: {reason}")]
    MissingValues { reason: String },

    #[error("Column '{0}' not found in atom descriptors input")]
    MissingColumn(String),

    #[error("No atom descriptor columns found in {path}")]
    NoDescriptorColumns { path: String },

    #[error(
        "Descriptor '{column}' of {smiles} has {found} values but the molecule has {expected} atoms"
    )]
    ShortDescriptor {
        smiles: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Descriptor '{column}' of {smiles} contains a non-numeric value '{value}'")]
    InvalidDescriptorValue {
        smiles: String,
        column: String,
        value: String,
    },

    #[error("Inconsistent array shapes: {0}")]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to read structure-data file: {0}")]
    Sdf(#[from] SdfError),

    #[error(transparent)]
    Smiles(#[from] SmilesError),
}
