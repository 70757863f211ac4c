use super::features::NdBlock;
use std::collections::HashMap;

/// An ordered table of optional string cells, as read from the data fields of a
/// structure-data file.
///
/// Columns appear in the order in which they were first encountered. A record
/// that lacks a field leaves the corresponding cell empty (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl DescriptorTable {
    /// Builds a table from records of `(field, value)` pairs.
    ///
    /// The column set is the union of all field names. When a record repeats a
    /// field, the last value wins.
    ///
    /// # Arguments
    ///
    /// * `records` - One list of named values per table row.
    ///
    /// # Return
    ///
    /// Returns a table with one row per record, in input order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Vec<(String, String)>>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut column_lookup: HashMap<String, usize> = HashMap::new();
        let mut sparse_rows = Vec::new();

        for record in records {
            let mut cells = Vec::with_capacity(record.len());
            for (name, value) in record {
                let idx = *column_lookup.entry(name.clone()).or_insert_with(|| {
                    columns.push(name);
                    columns.len() - 1
                });
                cells.push((idx, value));
            }
            sparse_rows.push(cells);
        }

        let width = columns.len();
        let rows = sparse_rows
            .into_iter()
            .map(|cells| {
                let mut row = vec![None; width];
                for (idx, value) in cells {
                    row[idx] = Some(value);
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Moves the named column into the row index.
    ///
    /// # Arguments
    ///
    /// * `column` - The name of the column that labels each row.
    ///
    /// # Return
    ///
    /// Returns the indexed table, or `None` if no such column exists.
    pub fn index_by(self, column: &str) -> Option<IndexedTable> {
        let idx = self.column_index(column)?;
        let mut columns = self.columns;
        columns.remove(idx);

        let mut index = Vec::with_capacity(self.rows.len());
        let mut rows = Vec::with_capacity(self.rows.len());
        for mut row in self.rows {
            index.push(row.remove(idx));
            rows.push(row);
        }

        Some(IndexedTable {
            index,
            columns,
            rows,
        })
    }
}

/// A [`DescriptorTable`] whose rows are labelled by one of its former columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedTable {
    index: Vec<Option<String>>,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl IndexedTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Removes rows whose label already appeared earlier, keeping the first.
    ///
    /// Rows without a label count as sharing the same (empty) label.
    ///
    /// # Return
    ///
    /// Returns the number of rows removed.
    pub fn drop_duplicate_index(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = std::collections::HashSet::new();
        let mut keep = Vec::with_capacity(before);
        for label in &self.index {
            keep.push(seen.insert(label.clone()));
        }

        let mut flags = keep.iter();
        self.index.retain(|_| *flags.next().unwrap_or(&false));
        let mut flags = keep.iter();
        self.rows.retain(|_| *flags.next().unwrap_or(&false));

        before - self.rows.len()
    }

    /// Finds the columns that look like per-atom descriptor lists.
    ///
    /// A column qualifies when its value in the first row is present and
    /// contains a comma. This is a best-effort heuristic: a comma-separated
    /// text field that is not a descriptor would be picked up as well, and a
    /// descriptor left empty in the first row would be missed.
    ///
    /// # Return
    ///
    /// Returns the positions of the qualifying columns, in table order.
    /// A table without rows has no qualifying columns.
    pub fn detect_descriptor_columns(&self) -> Vec<usize> {
        let Some(first) = self.rows.first() else {
            return Vec::new();
        };
        first
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.as_deref().is_some_and(|v| v.contains(',')))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Returns the row labelled `label`, if any.
    ///
    /// When duplicates have not been dropped, the first matching row is returned.
    pub fn row_by_label(&self, label: &str) -> Option<&[Option<String>]> {
        self.index
            .iter()
            .position(|l| l.as_deref() == Some(label))
            .map(|pos| self.rows[pos].as_slice())
    }
}

/// A table of numeric blocks decoded from a serialized atom-feature file.
///
/// Each row describes one molecule; each cell holds one descriptor block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<NdBlock>>,
}

impl AtomTable {
    /// Returns the block in the first column of the first row.
    pub fn first_cell(&self) -> Option<&NdBlock> {
        self.rows.first()?.first()
    }
}
