use super::error::{FormatError, ParseErrorKind};
use super::traits::FeatureReader;
use crate::core::models::features::FeatureMatrix;
use ndarray::Array2;
use std::io::{Read, Seek};

/// Comma-separated text: one header line, then one row of floats per molecule.
///
/// The header is skipped without being inspected, so its width does not have to
/// match the data. Values are trimmed before parsing. Blank lines are ignored.
pub struct DelimitedFeatures;

impl FeatureReader for DelimitedFeatures {
    type Output = FeatureMatrix;
    type Error = FormatError;

    fn read_from<R: Read + Seek>(reader: R) -> Result<Self::Output, Self::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut values = Vec::new();
        let mut width: Option<usize> = None;
        let mut num_rows = 0;

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map_or(row_idx + 2, |pos| pos.line() as usize);

            match width {
                None => width = Some(record.len()),
                Some(expected) if expected != record.len() => {
                    return Err(FormatError::Parse {
                        line,
                        kind: ParseErrorKind::RaggedRow {
                            expected,
                            found: record.len(),
                        },
                    });
                }
                Some(_) => {}
            }

            for (column, field) in record.iter().enumerate() {
                let value: f64 = field.trim().parse().map_err(|_| FormatError::Parse {
                    line,
                    kind: ParseErrorKind::InvalidFloat {
                        column: column + 1,
                        value: field.to_string(),
                    },
                })?;
                values.push(value);
            }
            num_rows += 1;
        }

        Ok(Array2::from_shape_vec(
            (num_rows, width.unwrap_or(0)),
            values,
        )?)
    }
}
