use super::config::{AtomDescriptorConfig, DescriptorColumns, ShortVectorPolicy};
use super::error::FeatureError;
use crate::core::chem::{AtomCounter, SmilesAtomCounter};
use crate::core::io::format::{AtomFeatureFormat, extension_of};
use crate::core::io::pickle::AtomTablePickle;
use crate::core::io::sdf::SdfFile;
use crate::core::io::traits::FeatureReader;
use crate::core::models::features::{AtomFeatures, NdBlock, concatenate_columns, stack_columns};
use crate::core::models::table::{AtomTable, IndexedTable};
use ndarray::{Array1, s};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Loads per-atom descriptors with the default configuration and the built-in
/// SMILES atom counter.
///
/// See [`load_valid_atom_features_with`].
pub fn load_valid_atom_features<P, S>(path: P, smiles: &[S]) -> Result<AtomFeatures, FeatureError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    load_valid_atom_features_with(
        path,
        smiles,
        &AtomDescriptorConfig::default(),
        &SmilesAtomCounter,
    )
}

/// Loads per-atom descriptors, one `(num_atoms, num_features)` block per molecule.
///
/// Two inputs are accepted:
///
/// - A pickled table (`.pkl`, `.pckl`, `.pickle`). The rank of the first cell
///   decides how each row is assembled: vectors are stacked as columns and
///   matrices are joined along their columns. `smiles` is not consulted and
///   the output follows table order.
/// - A structure-data file (`.sdf`). Records are keyed by their SMILES field and
///   returned in the order of `smiles`. Each descriptor field holds one
///   comma-separated value per atom and is cut to the atom count `counter`
///   reports.
///
/// # Arguments
///
/// * `path` - The descriptor file.
/// * `smiles` - The molecules to return descriptors for, in output order.
/// * `config` - Column selection and handling of short descriptor lists.
/// * `counter` - Supplies the atom count of each molecule.
///
/// # Errors
///
/// - [`FeatureError::UnsupportedAtomExtension`] for any other extension.
/// - [`FeatureError::AtomFormatNotSupported`] if table cells are neither vectors nor matrices.
/// - [`FeatureError::MissingValues`] if a requested molecule or one of its descriptors is absent.
/// - [`FeatureError::ShortDescriptor`] if a list is shorter than the atom count and
///   the policy is [`ShortVectorPolicy::Error`].
#[instrument(skip_all, name = "load_atom_features")]
pub fn load_valid_atom_features_with<P, S, C>(
    path: P,
    smiles: &[S],
    config: &AtomDescriptorConfig,
    counter: &C,
) -> Result<AtomFeatures, FeatureError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
    C: AtomCounter + ?Sized,
{
    let path = path.as_ref();
    let extension = extension_of(path);
    let format = AtomFeatureFormat::from_extension(&extension)
        .ok_or(FeatureError::UnsupportedAtomExtension { extension })?;
    debug!(path = %path.display(), ?format, "Dispatching atom descriptor file.");

    let features = match format {
        AtomFeatureFormat::PickleTable => {
            let table = AtomTablePickle::read_from_path(path)?;
            assemble_table(table, path)?
        }
        AtomFeatureFormat::StructureData => {
            let table = SdfFile::into_table(SdfFile::read_from_path(path)?);
            debug!(
                records = table.num_rows(),
                fields = table.columns().len(),
                "Read structure-data records."
            );
            let mut indexed = table
                .index_by(&config.smiles_column)
                .ok_or_else(|| FeatureError::MissingColumn(config.smiles_column.clone()))?;
            let dropped = indexed.drop_duplicate_index();
            if dropped > 0 {
                warn!(dropped, "Dropped records with a repeated SMILES; keeping the first.");
            }
            let columns = select_columns(&indexed, &config.columns, path)?;
            assemble_records(&indexed, &columns, smiles, config.short_vectors, counter)?
        }
    };

    info!(molecules = features.len(), "Loaded atom descriptors.");
    Ok(features)
}

fn assemble_table(table: AtomTable, path: &Path) -> Result<AtomFeatures, FeatureError> {
    let not_supported = || FeatureError::AtomFormatNotSupported {
        path: path.display().to_string(),
    };
    let Some(first) = table.first_cell() else {
        return Ok(Vec::new());
    };
    let ndim = first.ndim();
    debug!(
        rows = table.rows.len(),
        columns = table.columns.len(),
        ndim,
        "Assembling pickled descriptor table."
    );

    table
        .rows
        .iter()
        .map(|row| match ndim {
            1 => {
                let vectors = row
                    .iter()
                    .map(|cell| match cell {
                        NdBlock::Vector(v) => Ok(v.view()),
                        _ => Err(not_supported()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(stack_columns(&vectors)?)
            }
            2 => {
                let matrices = row
                    .iter()
                    .map(|cell| match cell {
                        NdBlock::Matrix(m) => Ok(m.view()),
                        _ => Err(not_supported()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(concatenate_columns(&matrices)?)
            }
            _ => Err(not_supported()),
        })
        .collect()
}

fn select_columns(
    table: &IndexedTable,
    selection: &DescriptorColumns,
    path: &Path,
) -> Result<Vec<usize>, FeatureError> {
    let columns = match selection {
        DescriptorColumns::Detect => table.detect_descriptor_columns(),
        DescriptorColumns::Named(names) => names
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| FeatureError::MissingColumn(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    if columns.is_empty() {
        return Err(FeatureError::NoDescriptorColumns {
            path: path.display().to_string(),
        });
    }
    debug!(
        columns = ?columns.iter().map(|&c| table.columns()[c].as_str()).collect::<Vec<_>>(),
        "Selected descriptor columns."
    );
    Ok(columns)
}

fn assemble_records<S, C>(
    table: &IndexedTable,
    columns: &[usize],
    smiles: &[S],
    policy: ShortVectorPolicy,
    counter: &C,
) -> Result<AtomFeatures, FeatureError>
where
    S: AsRef<str>,
    C: AtomCounter + ?Sized,
{
    // Every requested cell must exist before any value is parsed.
    let cells = smiles
        .iter()
        .map(|s| {
            let s = s.as_ref();
            let row = table.row_by_label(s).ok_or_else(|| FeatureError::MissingValues {
                reason: format!("no record for SMILES '{}'", s),
            })?;
            columns
                .iter()
                .map(|&c| {
                    row[c].as_deref().ok_or_else(|| FeatureError::MissingValues {
                        reason: format!(
                            "descriptor '{}' is empty for SMILES '{}'",
                            table.columns()[c],
                            s
                        ),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let parsed = smiles
        .iter()
        .zip(&cells)
        .map(|(s, row)| {
            row.iter()
                .zip(columns)
                .map(|(cell, &c)| parse_descriptor(cell, s.as_ref(), &table.columns()[c]))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    smiles
        .iter()
        .zip(parsed)
        .map(|(s, vectors)| {
            let s = s.as_ref();
            let num_atoms = counter.atom_count(s)?;
            let vectors = vectors
                .into_iter()
                .zip(columns)
                .map(|(v, &c)| fit_to_atoms(v, num_atoms, policy, s, &table.columns()[c]))
                .collect::<Result<Vec<_>, _>>()?;
            let views: Vec<_> = vectors.iter().map(|v| v.view()).collect();
            Ok(stack_columns(&views)?)
        })
        .collect()
}

fn parse_descriptor(cell: &str, smiles: &str, column: &str) -> Result<Array1<f64>, FeatureError> {
    cell.replace(['\r', '\n'], "")
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<f64>()
                .map_err(|_| FeatureError::InvalidDescriptorValue {
                    smiles: smiles.to_string(),
                    column: column.to_string(),
                    value: token.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Array1::from)
}

fn fit_to_atoms(
    values: Array1<f64>,
    num_atoms: usize,
    policy: ShortVectorPolicy,
    smiles: &str,
    column: &str,
) -> Result<Array1<f64>, FeatureError> {
    let found = values.len();
    if found > num_atoms {
        debug!(smiles, column, found, num_atoms, "Truncating descriptor to atom count.");
        return Ok(values.slice_move(s![..num_atoms]));
    }
    if found == num_atoms {
        return Ok(values);
    }
    match policy {
        ShortVectorPolicy::Error => Err(FeatureError::ShortDescriptor {
            smiles: smiles.to_string(),
            column: column.to_string(),
            expected: num_atoms,
            found,
        }),
        ShortVectorPolicy::PadWithZeros => {
            warn!(smiles, column, found, num_atoms, "Padding short descriptor with zeros.");
            let mut padded = Array1::zeros(num_atoms);
            padded.slice_mut(s![..found]).assign(&values);
            Ok(padded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::SmilesError;
    use ndarray::array;
    use serde_pickle::{HashableValue, SerOptions, Value};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn record(fields: &[(&str, &str)]) -> String {
        let mut text = String::from("mol\n  test\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n");
        for (name, value) in fields {
            text.push_str(&format!(">  <{}>\n{}\n\n", name, value));
        }
        text.push_str("$$$$\n");
        text
    }

    fn write_sdf(dir: &TempDir, records: &[String]) -> PathBuf {
        let path = dir.path().join("descriptors.sdf");
        fs::write(&path, records.concat()).unwrap();
        path
    }

    fn write_pickle(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, serde_pickle::value_to_vec(value, SerOptions::new()).unwrap()).unwrap();
        path
    }

    fn floats(values: &[f64]) -> Value {
        Value::List(values.iter().map(|v| Value::F64(*v)).collect())
    }

    fn split_table(columns: &[&str], rows: Vec<Vec<Value>>) -> Value {
        let mut dict = BTreeMap::new();
        dict.insert(
            HashableValue::String("columns".to_string()),
            Value::List(columns.iter().map(|c| Value::String(c.to_string())).collect()),
        );
        dict.insert(
            HashableValue::String("data".to_string()),
            Value::List(rows.into_iter().map(Value::List).collect()),
        );
        Value::Dict(dict)
    }

    fn fixed_counts(smiles: &str) -> Result<usize, SmilesError> {
        Ok(match smiles {
            "CO" => 2,
            "CCO" => 3,
            _ => 1,
        })
    }

    fn load_sdf(path: &Path, smiles: &[&str], config: &AtomDescriptorConfig) -> Result<AtomFeatures, FeatureError> {
        load_valid_atom_features_with(path, smiles, config, &fixed_counts)
    }

    #[test]
    fn pickle_vectors_are_stacked_as_columns() {
        let dir = tempdir().unwrap();
        let table = split_table(
            &["charge", "mass"],
            vec![
                vec![floats(&[0.1, 0.2, 0.3]), floats(&[12.0, 12.0, 16.0])],
                vec![floats(&[-0.1, 0.0, 0.1]), floats(&[14.0, 12.0, 1.0])],
            ],
        );
        let path = write_pickle(&dir, "atoms.pkl", &table);

        let features = load_valid_atom_features(&path, &["ignored"]).unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].dim(), (3, 2));
        assert_eq!(features[0], array![[0.1, 12.0], [0.2, 12.0], [0.3, 16.0]]);
        assert_eq!(features[1].column(1), array![14.0, 12.0, 1.0]);
    }

    #[test]
    fn pickle_matrices_are_concatenated_along_columns() {
        let dir = tempdir().unwrap();
        let block_a = Value::List(vec![floats(&[1.0, 2.0]), floats(&[3.0, 4.0])]);
        let block_b = Value::List(vec![floats(&[5.0]), floats(&[6.0])]);
        let path = write_pickle(
            &dir,
            "atoms.pickle",
            &Value::List(vec![Value::List(vec![block_a, block_b])]),
        );

        let features = load_valid_atom_features::<_, &str>(&path, &[]).unwrap();

        assert_eq!(features, vec![array![[1.0, 2.0, 5.0], [3.0, 4.0, 6.0]]]);
    }

    #[test]
    fn pickle_with_three_dimensional_cells_is_not_supported() {
        let dir = tempdir().unwrap();
        let cube = Value::List(vec![Value::List(vec![floats(&[1.0])])]);
        let path = write_pickle(&dir, "atoms.pckl", &split_table(&["cube"], vec![vec![cube]]));

        let err = load_valid_atom_features::<_, &str>(&path, &[]).unwrap_err();

        assert!(matches!(err, FeatureError::AtomFormatNotSupported { .. }));
        assert_eq!(
            err.to_string(),
            format!("Atom descriptors input {} format not supported", path.display())
        );
    }

    #[test]
    fn pickle_with_mixed_cell_ranks_is_not_supported() {
        let dir = tempdir().unwrap();
        let matrix = Value::List(vec![floats(&[1.0])]);
        let path = write_pickle(
            &dir,
            "atoms.pkl",
            &Value::List(vec![vec![floats(&[1.0])], vec![matrix]]
                .into_iter()
                .map(Value::List)
                .collect()),
        );

        let result = load_valid_atom_features::<_, &str>(&path, &[]);
        assert!(matches!(result, Err(FeatureError::AtomFormatNotSupported { .. })));
    }

    #[test]
    fn empty_pickle_table_yields_no_molecules() {
        let dir = tempdir().unwrap();
        let path = write_pickle(&dir, "atoms.pkl", &split_table(&["charge"], Vec::new()));

        assert!(load_valid_atom_features::<_, &str>(&path, &[]).unwrap().is_empty());
    }

    #[test]
    fn sdf_descriptors_follow_smiles_order_and_atom_counts() {
        let dir = tempdir().unwrap();
        let path = write_sdf(
            &dir,
            &[
                record(&[("SMILES", "CO"), ("charges", "0.1,-0.4,0.15,0.15"), ("name", "methanol")]),
                record(&[("SMILES", "CCO"), ("charges", "0.0,0.2,-0.3"), ("name", "ethanol")]),
            ],
        );

        let features = load_sdf(&path, &["CCO", "CO"], &AtomDescriptorConfig::default()).unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0], array![[0.0], [0.2], [-0.3]]);
        assert_eq!(features[1], array![[0.1], [-0.4]]);
    }

    #[test]
    fn sdf_detects_every_comma_separated_column() {
        let dir = tempdir().unwrap();
        let path = write_sdf(
            &dir,
            &[record(&[
                ("charges", "0.1,0.2"),
                ("SMILES", "CO"),
                ("label", "alcohol"),
                ("radii", "1.7,\r\n1.5"),
            ])],
        );

        let features = load_sdf(&path, &["CO"], &AtomDescriptorConfig::default()).unwrap();

        assert_eq!(features, vec![array![[0.1, 1.7], [0.2, 1.5]]]);
    }

    #[test]
    fn sdf_named_columns_override_detection() {
        let dir = tempdir().unwrap();
        let path = write_sdf(
            &dir,
            &[record(&[("SMILES", "CO"), ("charges", "0.1,0.2"), ("radii", "1.7,1.5")])],
        );
        let config = AtomDescriptorConfig {
            columns: DescriptorColumns::Named(vec!["radii".to_string()]),
            ..AtomDescriptorConfig::default()
        };

        let features = load_sdf(&path, &["CO"], &config).unwrap();
        assert_eq!(features, vec![array![[1.7], [1.5]]]);

        let config = AtomDescriptorConfig {
            columns: DescriptorColumns::Named(vec!["volume".to_string()]),
            ..AtomDescriptorConfig::default()
        };
        assert!(matches!(
            load_sdf(&path, &["CO"], &config),
            Err(FeatureError::MissingColumn(name)) if name == "volume"
        ));
    }

    #[test]
    fn sdf_custom_smiles_column_is_used_as_index() {
        let dir = tempdir().unwrap();
        let path = write_sdf(&dir, &[record(&[("canonical", "CO"), ("charges", "1,2")])]);
        let config = AtomDescriptorConfig {
            smiles_column: "canonical".to_string(),
            ..AtomDescriptorConfig::default()
        };

        assert_eq!(load_sdf(&path, &["CO"], &config).unwrap(), vec![array![[1.0], [2.0]]]);
        assert!(matches!(
            load_sdf(&path, &["CO"], &AtomDescriptorConfig::default()),
            Err(FeatureError::MissingColumn(name)) if name == "SMILES"
        ));
    }

    #[test]
    fn sdf_unknown_smiles_reports_nan_found() {
        let dir = tempdir().unwrap();
        let path = write_sdf(&dir, &[record(&[("SMILES", "CO"), ("charges", "0.1,0.2")])]);

        let err = load_sdf(&path, &["CO", "CCN"], &AtomDescriptorConfig::default()).unwrap_err();

        assert!(matches!(err, FeatureError::MissingValues { .. }));
        assert!(
            err.to_string()
                .starts_with("Invalid custom atomic descriptors file, Nan found in data")
        );
    }

    #[test]
    fn sdf_record_missing_a_descriptor_reports_nan_found() {
        let dir = tempdir().unwrap();
        let path = write_sdf(
            &dir,
            &[
                record(&[("SMILES", "CO"), ("charges", "0.1,0.2")]),
                record(&[("SMILES", "CCO")]),
            ],
        );

        let result = load_sdf(&path, &["CCO"], &AtomDescriptorConfig::default());
        assert!(matches!(result, Err(FeatureError::MissingValues { .. })));
    }

    #[test]
    fn sdf_duplicate_smiles_keep_first_record() {
        let dir = tempdir().unwrap();
        let path = write_sdf(
            &dir,
            &[
                record(&[("SMILES", "CO"), ("charges", "1,2")]),
                record(&[("SMILES", "CO"), ("charges", "8,9")]),
            ],
        );

        let features = load_sdf(&path, &["CO", "CO"], &AtomDescriptorConfig::default()).unwrap();

        assert_eq!(features, vec![array![[1.0], [2.0]], array![[1.0], [2.0]]]);
    }

    #[test]
    fn sdf_without_descriptor_columns_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write_sdf(&dir, &[record(&[("SMILES", "CO"), ("label", "alcohol")])]);

        let result = load_sdf(&path, &["CO"], &AtomDescriptorConfig::default());
        assert!(matches!(result, Err(FeatureError::NoDescriptorColumns { .. })));
    }

    #[test]
    fn sdf_short_descriptor_fails_by_default_and_pads_when_asked() {
        let dir = tempdir().unwrap();
        let path = write_sdf(&dir, &[record(&[("SMILES", "CCO"), ("charges", "0.5,0.25")])]);

        let err = load_sdf(&path, &["CCO"], &AtomDescriptorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::ShortDescriptor {
                expected: 3,
                found: 2,
                ..
            }
        ));

        let config = AtomDescriptorConfig {
            short_vectors: ShortVectorPolicy::PadWithZeros,
            ..AtomDescriptorConfig::default()
        };
        assert_eq!(
            load_sdf(&path, &["CCO"], &config).unwrap(),
            vec![array![[0.5], [0.25], [0.0]]]
        );
    }

    #[test]
    fn sdf_non_numeric_descriptor_value_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write_sdf(&dir, &[record(&[("SMILES", "CO"), ("charges", "0.1,abc")])]);

        let result = load_sdf(&path, &["CO"], &AtomDescriptorConfig::default());
        assert!(matches!(
            result,
            Err(FeatureError::InvalidDescriptorValue { value, .. }) if value == "abc"
        ));
    }

    #[test]
    fn sdf_missing_values_are_reported_before_parse_errors() {
        let dir = tempdir().unwrap();
        let path = write_sdf(&dir, &[record(&[("SMILES", "CO"), ("charges", "x,y")])]);

        let result = load_sdf(&path, &["CO", "CCN"], &AtomDescriptorConfig::default());
        assert!(matches!(result, Err(FeatureError::MissingValues { .. })));
    }

    #[test]
    fn sdf_default_counter_parses_smiles() {
        let dir = tempdir().unwrap();
        let path = write_sdf(
            &dir,
            &[record(&[("SMILES", "[H]OC"), ("charges", "0.1,0.2,0.3,0.4,0.5,0.6")])],
        );

        let features = load_valid_atom_features(&path, &["[H]OC".to_string()]).unwrap();

        assert_eq!(features, vec![array![[0.1], [0.2]]]);
    }

    #[test]
    fn sdf_invalid_smiles_propagates_counter_error() {
        let dir = tempdir().unwrap();
        let path = write_sdf(&dir, &[record(&[("SMILES", "C1CC"), ("charges", "1,2,3")])]);

        let result = load_valid_atom_features(&path, &["C1CC"]);
        assert!(matches!(result, Err(FeatureError::Smiles(_))));
    }

    #[test]
    fn unknown_atom_descriptor_extension_is_rejected() {
        let result = load_valid_atom_features("descriptors.csv", &["C"]);
        assert!(matches!(
            result,
            Err(FeatureError::UnsupportedAtomExtension { extension }) if extension == ".csv"
        ));
    }
}
