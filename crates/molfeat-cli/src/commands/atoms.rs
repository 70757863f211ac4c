use crate::cli::AtomsArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use molfeat::core::chem::SmilesAtomCounter;
use molfeat::core::io::format::{AtomFeatureFormat, extension_of};
use molfeat::core::io::npz::write_named_arrays;
use molfeat::workflows::{self, npz_path};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Reads one SMILES per row from a headered CSV file.
///
/// `column` selects the column by header name; without it the first column is used.
pub fn read_smiles(path: &Path, column: Option<&str>) -> Result<Vec<String>> {
    let parse_error = |e: csv::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(parse_error)?;

    let index = match column {
        Some(name) => reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| {
                CliError::Argument(format!(
                    "Column '{}' not found in SMILES file {}",
                    name,
                    path.display()
                ))
            })?,
        None => 0,
    };

    let mut smiles = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        // Rows map onto molecule indices, so a blank cell cannot be skipped.
        let value = record
            .get(index)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                CliError::Argument(format!(
                    "Empty SMILES on line {} of {}",
                    record.position().map_or(0, |p| p.line()),
                    path.display()
                ))
            })?;
        smiles.push(value.to_string());
    }
    debug!(count = smiles.len(), "Read SMILES list.");
    Ok(smiles)
}

pub fn run(args: AtomsArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let smiles = match &args.smiles {
        Some(path) => read_smiles(path, args.smiles_column.as_deref())?,
        None => {
            let extension = extension_of(&args.input);
            if AtomFeatureFormat::from_extension(&extension)
                == Some(AtomFeatureFormat::StructureData)
            {
                return Err(CliError::Argument(
                    "--smiles is required when reading descriptors from an .sdf file".to_string(),
                ));
            }
            Vec::new()
        }
    };

    info!("Loading atom descriptors from {:?}", &args.input);
    let features = workflows::load_valid_atom_features_with(
        &args.input,
        smiles.as_slice(),
        &config,
        &SmilesAtomCounter,
    )?;

    for (i, block) in features.iter().enumerate() {
        let label = smiles.get(i).map_or("", String::as_str);
        println!("{}\t{}\t({}, {})", i, label, block.nrows(), block.ncols());
    }

    if let Some(output) = &args.output {
        let output = npz_path(output);
        let names: Vec<String> = (0..features.len()).map(|i| format!("mol_{}", i)).collect();
        let file = File::create(&output)?;
        let mut writer = write_named_arrays(
            BufWriter::new(file),
            names.iter().map(String::as_str).zip(features.iter()),
        )
        .map_err(|e| CliError::FileParsing {
            path: output.clone(),
            source: e.into(),
        })?;
        writer.flush()?;
        println!(
            "Wrote {} descriptor block(s) to {}",
            features.len(),
            output.display()
        );
    }

    Ok(())
}
