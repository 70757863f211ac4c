use super::error::FeatureError;
use crate::core::io::delimited::DelimitedFeatures;
use crate::core::io::format::{FeatureFormat, extension_of};
use crate::core::io::npy::NpyFeatures;
use crate::core::io::npz::NpzFeatures;
use crate::core::io::pickle::SparsePickleFeatures;
use crate::core::io::traits::{FeatureReader, FeatureWriter};
use crate::core::models::features::{FeatureMatrix, stack_rows};
use ndarray::Array1;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Returns the path an archive is actually written to: `path` itself when it
/// already ends in `.npz`, otherwise `path` with `.npz` appended.
pub fn npz_path(path: &Path) -> PathBuf {
    if extension_of(path) == ".npz" {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".npz");
    PathBuf::from(name)
}

/// Saves molecule-level features to a compressed `.npz` archive.
///
/// The vectors are stacked into an `(N, D)` matrix stored under the member
/// name `features`. An existing file is overwritten.
///
/// # Arguments
///
/// * `path` - The destination. `.npz` is appended when the path has another
///   extension or none.
/// * `features` - One feature vector per molecule.
///
/// # Errors
///
/// Returns [`FeatureError::Shape`] if the vectors differ in length, and
/// [`FeatureError::Format`] if the archive cannot be written.
#[instrument(skip_all, name = "save_features")]
pub fn save_features<P: AsRef<Path>>(path: P, features: &[Array1<f64>]) -> Result<(), FeatureError> {
    let path = npz_path(path.as_ref());
    let views: Vec<_> = features.iter().map(|f| f.view()).collect();
    let matrix = stack_rows(&views)?;

    NpzFeatures::write_to_path(&matrix, &path)?;
    info!(
        path = %path.display(),
        rows = matrix.nrows(),
        cols = matrix.ncols(),
        "Saved features."
    );
    Ok(())
}

/// Loads molecule-level features from a file, choosing the decoder by extension.
///
/// | extension | decoding |
/// |---|---|
/// | `.npz` | the `features` member of the archive |
/// | `.npy` | the stored array |
/// | `.csv`, `.txt` | comma-separated rows after a header line |
/// | `.pkl`, `.pckl`, `.pickle` | a list of sparse rows, densified and stacked |
///
/// # Arguments
///
/// * `path` - The file to read.
///
/// # Return
///
/// Returns a 2D matrix with one row per molecule.
///
/// # Errors
///
/// Returns [`FeatureError::UnsupportedExtension`] for any other extension
/// (matching is case-sensitive), or [`FeatureError::Format`] if decoding fails.
#[instrument(skip_all, name = "load_features")]
pub fn load_features<P: AsRef<Path>>(path: P) -> Result<FeatureMatrix, FeatureError> {
    let path = path.as_ref();
    let extension = extension_of(path);
    let format = FeatureFormat::from_extension(&extension)
        .ok_or(FeatureError::UnsupportedExtension { extension })?;
    debug!(path = %path.display(), ?format, "Dispatching feature file.");

    let features = match format {
        FeatureFormat::Npz => NpzFeatures::read_from_path(path)?,
        FeatureFormat::Npy => NpyFeatures::read_from_path(path)?,
        FeatureFormat::Delimited => DelimitedFeatures::read_from_path(path)?,
        FeatureFormat::SparsePickle => SparsePickleFeatures::read_from_path(path)?,
    };

    info!(
        rows = features.nrows(),
        cols = features.ncols(),
        "Loaded features."
    );
    Ok(features)
}
