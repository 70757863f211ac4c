use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, ShapeError};

/// Molecule-level features, one row per molecule.
///
/// Rows correspond positionally to a list of SMILES maintained by the caller;
/// that correspondence is never checked by the loaders.
pub type FeatureMatrix = Array2<f64>;

/// Atom-level features, one `(num_atoms, feature_dim)` block per molecule.
pub type AtomFeatures = Vec<Array2<f64>>;

/// A numeric cell decoded from a serialized table, tagged by its rank.
#[derive(Debug, Clone, PartialEq)]
pub enum NdBlock {
    Vector(Array1<f64>),
    Matrix(Array2<f64>),
    /// A scalar or an array of rank three or more; kept so callers can report it.
    Unsupported { ndim: usize },
}

impl NdBlock {
    pub fn ndim(&self) -> usize {
        match self {
            NdBlock::Vector(_) => 1,
            NdBlock::Matrix(_) => 2,
            NdBlock::Unsupported { ndim } => *ndim,
        }
    }
}

/// Stacks equally sized vectors into the rows of a matrix.
///
/// # Arguments
///
/// * `rows` - The row vectors, in output order.
///
/// # Return
///
/// Returns an `(rows.len(), dim)` matrix. An empty input yields a `(0, 0)` matrix.
///
/// # Errors
///
/// Returns a [`ShapeError`] if the vectors differ in length.
pub fn stack_rows(rows: &[ArrayView1<'_, f64>]) -> Result<FeatureMatrix, ShapeError> {
    if rows.is_empty() {
        return Ok(Array2::zeros((0, 0)));
    }
    ndarray::stack(Axis(0), rows)
}

/// Stacks equally sized vectors side by side, one vector per output column.
///
/// This is the per-molecule assembly step for atom descriptors: each vector
/// holds one descriptor for every atom, so the result is `(num_atoms, num_descriptors)`.
///
/// # Errors
///
/// Returns a [`ShapeError`] if `columns` is empty or the vectors differ in length.
pub fn stack_columns(columns: &[ArrayView1<'_, f64>]) -> Result<Array2<f64>, ShapeError> {
    ndarray::stack(Axis(1), columns)
}

/// Joins matrices with the same row count along their columns.
///
/// # Errors
///
/// Returns a [`ShapeError`] if `blocks` is empty or the row counts differ.
pub fn concatenate_columns(blocks: &[ArrayView2<'_, f64>]) -> Result<Array2<f64>, ShapeError> {
    ndarray::concatenate(Axis(1), blocks)
}
