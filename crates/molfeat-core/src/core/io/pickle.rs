//! Pickle-based feature formats.
//!
//! Python pickles of SciPy or pandas objects reference classes that cannot be
//! reconstructed outside Python, so both readers here accept the plain-container
//! layouts those objects export to:
//!
//! - molecule features: a list whose items are either sparse-matrix dicts
//!   (`{"format": "csr", "shape": (1, n), "data": [...], "indices": [...], "indptr": [...]}`,
//!   also `"csc"` and `"coo"` with `row`/`col`), dense nested lists, or flat lists;
//! - atom features: `DataFrame.to_dict(orient="split")` with cells converted to
//!   nested lists, or a bare list of rows.

use super::error::FormatError;
use super::traits::FeatureReader;
use crate::core::models::features::{FeatureMatrix, NdBlock, stack_rows};
use crate::core::models::table::AtomTable;
use ndarray::{Array1, Array2};
use serde::Deserialize;
use serde_pickle::{DeOptions, HashableValue, Value};
use std::io::{Read, Seek};

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SparseFormat {
    #[default]
    Csr,
    Csc,
    Coo,
}

/// The exported state of a SciPy sparse matrix.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SparseMatrix {
    #[serde(default)]
    pub format: SparseFormat,
    pub shape: (usize, usize),
    pub data: Vec<f64>,
    #[serde(default)]
    pub indices: Vec<usize>,
    #[serde(default)]
    pub indptr: Vec<usize>,
    #[serde(default)]
    pub row: Vec<usize>,
    #[serde(default)]
    pub col: Vec<usize>,
}

impl SparseMatrix {
    /// Expands the matrix into dense storage. Duplicate entries are summed.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Malformed`] if the index arrays are inconsistent
    /// with `data` or point outside `shape`.
    pub fn to_dense(&self) -> Result<Array2<f64>, FormatError> {
        let mut dense = Array2::zeros(self.shape);
        match self.format {
            SparseFormat::Csr => self.accumulate_compressed(&mut dense, false)?,
            SparseFormat::Csc => self.accumulate_compressed(&mut dense, true)?,
            SparseFormat::Coo => {
                if self.row.len() != self.data.len() || self.col.len() != self.data.len() {
                    return Err(FormatError::Malformed(format!(
                        "coo matrix has {} values but {} row and {} column indices",
                        self.data.len(),
                        self.row.len(),
                        self.col.len()
                    )));
                }
                for ((&r, &c), &v) in self.row.iter().zip(&self.col).zip(&self.data) {
                    self.check_bounds(r, c)?;
                    dense[[r, c]] += v;
                }
            }
        }
        Ok(dense)
    }

    fn accumulate_compressed(
        &self,
        dense: &mut Array2<f64>,
        by_column: bool,
    ) -> Result<(), FormatError> {
        let (rows, cols) = self.shape;
        let major = if by_column { cols } else { rows };

        if self.indptr.len() != major + 1 {
            return Err(FormatError::Malformed(format!(
                "indptr has {} entries, expected {}",
                self.indptr.len(),
                major + 1
            )));
        }
        if self.indices.len() != self.data.len() {
            return Err(FormatError::Malformed(format!(
                "{} indices for {} values",
                self.indices.len(),
                self.data.len()
            )));
        }

        for (m, window) in self.indptr.windows(2).enumerate() {
            let (start, end) = (window[0], window[1]);
            if start > end || end > self.data.len() {
                return Err(FormatError::Malformed(format!(
                    "indptr range {}..{} is invalid",
                    start, end
                )));
            }
            for k in start..end {
                let n = self.indices[k];
                let (r, c) = if by_column { (n, m) } else { (m, n) };
                self.check_bounds(r, c)?;
                dense[[r, c]] += self.data[k];
            }
        }
        Ok(())
    }

    fn check_bounds(&self, r: usize, c: usize) -> Result<(), FormatError> {
        if r >= self.shape.0 || c >= self.shape.1 {
            return Err(FormatError::Malformed(format!(
                "entry ({}, {}) lies outside shape {:?}",
                r, c, self.shape
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PickledMatrix {
    Sparse(SparseMatrix),
    Dense(Vec<Vec<f64>>),
    Flat(Vec<f64>),
}

impl PickledMatrix {
    fn into_row(self) -> Result<Array1<f64>, FormatError> {
        match self {
            PickledMatrix::Sparse(sparse) => squeeze(sparse.to_dense()?),
            PickledMatrix::Dense(rows) => {
                let num_rows = rows.len();
                let num_cols = rows.first().map_or(0, Vec::len);
                if rows.iter().any(|r| r.len() != num_cols) {
                    return Err(FormatError::Malformed(
                        "dense matrix rows differ in length".to_string(),
                    ));
                }
                let values = rows.into_iter().flatten().collect();
                squeeze(Array2::from_shape_vec((num_rows, num_cols), values)?)
            }
            PickledMatrix::Flat(values) => Ok(Array1::from(values)),
        }
    }
}

/// Drops unit dimensions of a matrix, leaving a vector.
fn squeeze(matrix: Array2<f64>) -> Result<Array1<f64>, FormatError> {
    match matrix.dim() {
        (1, _) => Ok(matrix.row(0).to_owned()),
        (_, 1) => Ok(matrix.column(0).to_owned()),
        (rows, cols) => Err(FormatError::Squeeze { rows, cols }),
    }
}

/// A pickled list of per-molecule sparse feature rows.
pub struct SparsePickleFeatures;

impl FeatureReader for SparsePickleFeatures {
    type Output = FeatureMatrix;
    type Error = FormatError;

    fn read_from<R: Read + Seek>(reader: R) -> Result<Self::Output, Self::Error> {
        let matrices: Vec<PickledMatrix> = serde_pickle::from_reader(reader, DeOptions::new())?;
        let rows = matrices
            .into_iter()
            .map(PickledMatrix::into_row)
            .collect::<Result<Vec<_>, _>>()?;
        let views: Vec<_> = rows.iter().map(|r| r.view()).collect();
        Ok(stack_rows(&views)?)
    }
}

/// A pickled table of per-molecule atom descriptor blocks.
pub struct AtomTablePickle;

impl FeatureReader for AtomTablePickle {
    type Output = AtomTable;
    type Error = FormatError;

    fn read_from<R: Read + Seek>(reader: R) -> Result<Self::Output, Self::Error> {
        let value = serde_pickle::value_from_reader(reader, DeOptions::new())?;
        let (columns, raw_rows) = match value {
            Value::Dict(mut dict) => {
                let data = dict
                    .remove(&HashableValue::String("data".to_string()))
                    .ok_or_else(|| {
                        FormatError::Malformed("table dict has no 'data' entry".to_string())
                    })?;
                let columns = match dict.remove(&HashableValue::String("columns".to_string())) {
                    Some(value) => column_labels(value)?,
                    None => Vec::new(),
                };
                (columns, sequence(data, "table data")?)
            }
            other => (Vec::new(), sequence(other, "table")?),
        };

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                sequence(row, "table row")?
                    .iter()
                    .map(block_from_value)
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let width = rows.first().map_or(0, Vec::len);
        let columns = if columns.is_empty() {
            (0..width).map(|i| i.to_string()).collect()
        } else {
            columns
        };
        Ok(AtomTable { columns, rows })
    }
}

fn sequence(value: Value, what: &str) -> Result<Vec<Value>, FormatError> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items),
        _ => Err(FormatError::Malformed(format!("{} is not a list", what))),
    }
}

fn column_labels(value: Value) -> Result<Vec<String>, FormatError> {
    sequence(value, "column list")?
        .into_iter()
        .map(|label| match label {
            Value::String(name) => Ok(name),
            Value::I64(n) => Ok(n.to_string()),
            _ => Err(FormatError::Malformed(
                "column labels must be strings or integers".to_string(),
            )),
        })
        .collect()
}

fn rank(value: &Value) -> usize {
    match value {
        Value::List(items) | Value::Tuple(items) => 1 + items.first().map_or(0, rank),
        _ => 0,
    }
}

fn scalar(value: &Value) -> Result<f64, FormatError> {
    match value {
        Value::F64(v) => Ok(*v),
        Value::I64(v) => Ok(*v as f64),
        Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
        _ => Err(FormatError::Malformed(
            "descriptor cells must contain only numbers".to_string(),
        )),
    }
}

fn scalars(value: &Value) -> Result<Vec<f64>, FormatError> {
    match value {
        Value::List(items) | Value::Tuple(items) => items.iter().map(scalar).collect(),
        _ => Err(FormatError::Malformed(
            "expected a list of numbers".to_string(),
        )),
    }
}

fn block_from_value(value: &Value) -> Result<NdBlock, FormatError> {
    match (rank(value), value) {
        (1, _) => Ok(NdBlock::Vector(Array1::from(scalars(value)?))),
        (2, Value::List(items) | Value::Tuple(items)) => {
            let rows = items
                .iter()
                .map(scalars)
                .collect::<Result<Vec<_>, _>>()?;
            let num_rows = rows.len();
            let num_cols = rows.first().map_or(0, Vec::len);
            if rows.iter().any(|r| r.len() != num_cols) {
                return Err(FormatError::Malformed(
                    "matrix cell rows differ in length".to_string(),
                ));
            }
            let values = rows.into_iter().flatten().collect();
            Ok(NdBlock::Matrix(Array2::from_shape_vec(
                (num_rows, num_cols),
                values,
            )?))
        }
        (ndim, _) => Ok(NdBlock::Unsupported { ndim }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    fn pickled(value: &Value) -> Cursor<Vec<u8>> {
        let bytes = serde_pickle::value_to_vec(value, serde_pickle::SerOptions::new()).unwrap();
        Cursor::new(bytes)
    }

    fn key(name: &str) -> HashableValue {
        HashableValue::String(name.to_string())
    }

    fn floats(values: &[f64]) -> Value {
        Value::List(values.iter().map(|v| Value::F64(*v)).collect())
    }

    fn ints(values: &[i64]) -> Value {
        Value::List(values.iter().map(|v| Value::I64(*v)).collect())
    }

    fn sparse(format: &str, shape: (i64, i64), entries: &[(&str, Value)]) -> Value {
        let mut dict = BTreeMap::new();
        dict.insert(key("format"), Value::String(format.to_string()));
        dict.insert(
            key("shape"),
            Value::Tuple(vec![Value::I64(shape.0), Value::I64(shape.1)]),
        );
        for (name, value) in entries {
            dict.insert(key(name), value.clone());
        }
        Value::Dict(dict)
    }

    #[test]
    fn csr_row_vectors_are_densified_and_stacked() {
        let first = sparse(
            "csr",
            (1, 4),
            &[
                ("data", floats(&[1.0, 2.0])),
                ("indices", ints(&[0, 3])),
                ("indptr", ints(&[0, 2])),
            ],
        );
        let second = sparse(
            "csr",
            (1, 4),
            &[
                ("data", floats(&[5.0])),
                ("indices", ints(&[1])),
                ("indptr", ints(&[0, 1])),
            ],
        );
        let features =
            SparsePickleFeatures::read_from(pickled(&Value::List(vec![first, second]))).unwrap();
        assert_eq!(
            features,
            array![[1.0, 0.0, 0.0, 2.0], [0.0, 5.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn csc_column_vector_is_squeezed_to_row() {
        let column = sparse(
            "csc",
            (3, 1),
            &[
                ("data", floats(&[7.0])),
                ("indices", ints(&[2])),
                ("indptr", ints(&[0, 1])),
            ],
        );
        let features = SparsePickleFeatures::read_from(pickled(&Value::List(vec![column]))).unwrap();
        assert_eq!(features, array![[0.0, 0.0, 7.0]]);
    }

    #[test]
    fn coo_duplicates_are_summed() {
        let matrix = sparse(
            "coo",
            (1, 3),
            &[
                ("data", floats(&[1.0, 2.5])),
                ("row", ints(&[0, 0])),
                ("col", ints(&[1, 1])),
            ],
        );
        let features = SparsePickleFeatures::read_from(pickled(&Value::List(vec![matrix]))).unwrap();
        assert_eq!(features, array![[0.0, 3.5, 0.0]]);
    }

    #[test]
    fn dense_and_flat_items_are_accepted() {
        let dense = Value::List(vec![floats(&[1.0, 2.0])]);
        let flat = ints(&[3, 4]);
        let features =
            SparsePickleFeatures::read_from(pickled(&Value::List(vec![dense, flat]))).unwrap();
        assert_eq!(features, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn matrix_with_two_non_unit_dimensions_is_rejected() {
        let matrix = sparse(
            "csr",
            (2, 2),
            &[
                ("data", floats(&[1.0])),
                ("indices", ints(&[0])),
                ("indptr", ints(&[0, 1, 1])),
            ],
        );
        let result = SparsePickleFeatures::read_from(pickled(&Value::List(vec![matrix])));
        assert!(matches!(result, Err(FormatError::Squeeze { rows: 2, cols: 2 })));
    }

    #[test]
    fn out_of_bounds_index_is_malformed() {
        let matrix = sparse(
            "csr",
            (1, 2),
            &[
                ("data", floats(&[1.0])),
                ("indices", ints(&[5])),
                ("indptr", ints(&[0, 1])),
            ],
        );
        let result = SparsePickleFeatures::read_from(pickled(&Value::List(vec![matrix])));
        assert!(matches!(result, Err(FormatError::Malformed(_))));
    }

    #[test]
    fn rows_of_different_width_fail_to_stack() {
        let result =
            SparsePickleFeatures::read_from(pickled(&Value::List(vec![ints(&[1, 2]), ints(&[3])])));
        assert!(matches!(result, Err(FormatError::Shape(_))));
    }

    #[test]
    fn atom_table_reads_split_layout_with_vector_cells() {
        let mut dict = BTreeMap::new();
        dict.insert(
            key("columns"),
            Value::List(vec![
                Value::String("charge".into()),
                Value::String("mass".into()),
            ]),
        );
        dict.insert(key("index"), ints(&[0, 1]));
        dict.insert(
            key("data"),
            Value::List(vec![
                Value::List(vec![floats(&[0.1, 0.2]), floats(&[12.0, 16.0])]),
                Value::List(vec![floats(&[0.3]), floats(&[14.0])]),
            ]),
        );

        let table = AtomTablePickle::read_from(pickled(&Value::Dict(dict))).unwrap();
        assert_eq!(table.columns, ["charge", "mass"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[1][1],
            NdBlock::Vector(array![14.0])
        );
    }

    #[test]
    fn atom_table_reads_bare_rows_and_numbers_columns() {
        let rows = Value::List(vec![Value::List(vec![Value::List(vec![
            floats(&[1.0, 2.0]),
            floats(&[3.0, 4.0]),
        ])])]);
        let table = AtomTablePickle::read_from(pickled(&rows)).unwrap();
        assert_eq!(table.columns, ["0"]);
        assert_eq!(
            table.first_cell(),
            Some(&NdBlock::Matrix(array![[1.0, 2.0], [3.0, 4.0]]))
        );
    }

    #[test]
    fn atom_table_marks_higher_rank_cells_as_unsupported() {
        let cube = Value::List(vec![Value::List(vec![floats(&[1.0])])]);
        let rows = Value::List(vec![Value::List(vec![cube])]);
        let table = AtomTablePickle::read_from(pickled(&rows)).unwrap();
        assert_eq!(table.first_cell(), Some(&NdBlock::Unsupported { ndim: 3 }));
    }

    #[test]
    fn atom_table_rejects_non_numeric_cells() {
        let rows = Value::List(vec![Value::List(vec![Value::List(vec![Value::String(
            "x".into(),
        )])])]);
        let result = AtomTablePickle::read_from(pickled(&rows));
        assert!(matches!(result, Err(FormatError::Malformed(_))));
    }

    #[test]
    fn atom_table_requires_data_entry_in_dict_layout() {
        let mut dict = BTreeMap::new();
        dict.insert(key("columns"), Value::List(vec![]));
        let result = AtomTablePickle::read_from(pickled(&Value::Dict(dict)));
        assert!(matches!(result, Err(FormatError::Malformed(_))));
    }
}
