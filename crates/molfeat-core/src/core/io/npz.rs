use super::error::FormatError;
use super::npy::{Widen, into_matrix};
use super::traits::{FeatureReader, FeatureWriter};
use crate::core::models::features::FeatureMatrix;
use ndarray::{Array2, ArrayD};
use ndarray_npy::{NpzReader, NpzWriter};
use std::io::{Read, Seek, Write};

/// Name of the archive member holding molecule-level features.
pub const FEATURES_KEY: &str = "features";

/// A compressed NumPy `.npz` archive whose `features` member is the feature matrix.
pub struct NpzFeatures;

impl FeatureReader for NpzFeatures {
    type Output = FeatureMatrix;
    type Error = FormatError;

    fn read_from<R: Read + Seek>(reader: R) -> Result<Self::Output, Self::Error> {
        let mut npz = NpzReader::new(reader)?;
        read_named_matrix(&mut npz, FEATURES_KEY)
    }
}

impl FeatureWriter for NpzFeatures {
    type Input = FeatureMatrix;
    type Error = FormatError;

    fn write_to<W: Write + Seek>(input: &Self::Input, writer: W) -> Result<W, Self::Error> {
        write_named_arrays(writer, [(FEATURES_KEY, input)])
    }
}

fn member_as<T: Widen, R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Option<ArrayD<f64>> {
    let array: ArrayD<T> = npz.by_name(name).ok()?;
    Some(array.mapv(Widen::widen))
}

/// Reads one 2D member of an archive. `float64` data is read as is; `float32`,
/// integer and boolean data are converted to `float64`.
///
/// NumPy stores members with a `.npy` suffix; `name` may be given with or without it.
///
/// # Errors
///
/// Returns [`FormatError::NpzRead`] if the member is missing or unreadable, and
/// [`FormatError::Dimensionality`] if it is not two-dimensional.
pub fn read_named_matrix<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    name: &str,
) -> Result<FeatureMatrix, FormatError> {
    let wide: Result<ArrayD<f64>, _> = npz.by_name(name);
    let err = match wide {
        Ok(array) => return into_matrix(array),
        Err(err) => err,
    };

    type MemberAs<R> = fn(&mut NpzReader<R>, &str) -> Option<ArrayD<f64>>;
    let fallbacks: [MemberAs<R>; 10] = [
        member_as::<f32, R>,
        member_as::<i64, R>,
        member_as::<i32, R>,
        member_as::<i16, R>,
        member_as::<i8, R>,
        member_as::<u64, R>,
        member_as::<u32, R>,
        member_as::<u16, R>,
        member_as::<u8, R>,
        member_as::<bool, R>,
    ];
    fallbacks
        .iter()
        .find_map(|read| read(npz, name))
        .map_or(Err(err.into()), into_matrix)
}

/// Writes named 2D arrays into a compressed archive.
///
/// # Arguments
///
/// * `writer` - The destination; must support seeking for the zip directory.
/// * `arrays` - `(name, array)` pairs, written in iteration order.
///
/// # Return
///
/// Returns the writer after the archive directory has been written.
///
/// # Errors
///
/// Returns [`FormatError::NpzWrite`] if any member cannot be written.
pub fn write_named_arrays<'a, W, I>(writer: W, arrays: I) -> Result<W, FormatError>
where
    W: Write + Seek,
    I: IntoIterator<Item = (&'a str, &'a Array2<f64>)>,
{
    let mut npz = NpzWriter::new_compressed(writer);
    for (name, array) in arrays {
        npz.add_array(name, array)?;
    }
    Ok(npz.finish()?)
}
