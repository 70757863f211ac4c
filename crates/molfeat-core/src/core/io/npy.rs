use super::error::FormatError;
use super::traits::FeatureReader;
use crate::core::models::features::FeatureMatrix;
use ndarray::{ArrayD, Ix2};
use ndarray_npy::{ReadNpyExt, ReadableElement};
use std::io::{Read, Seek, SeekFrom};

/// Stored element types that are widened to `f64` on load.
pub(crate) trait Widen: ReadableElement + Clone {
    fn widen(self) -> f64;
}

macro_rules! impl_widen {
    ($($t:ty),*) => {
        $(impl Widen for $t {
            fn widen(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_widen!(f32, i64, i32, i16, i8, u64, u32, u16, u8);

impl Widen for bool {
    fn widen(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }
}

fn read_as<T: Widen, R: Read + Seek>(
    reader: &mut R,
    start: u64,
) -> Result<Option<ArrayD<f64>>, FormatError> {
    reader.seek(SeekFrom::Start(start))?;
    Ok(ArrayD::<T>::read_npy(&mut *reader)
        .ok()
        .map(|array| array.mapv(Widen::widen)))
}

/// A raw NumPy `.npy` file holding a 2D feature matrix.
///
/// `float64` data is read as is. `float32`, integer and boolean data are
/// converted to `float64`.
pub struct NpyFeatures;

impl FeatureReader for NpyFeatures {
    type Output = FeatureMatrix;
    type Error = FormatError;

    fn read_from<R: Read + Seek>(mut reader: R) -> Result<Self::Output, Self::Error> {
        let start = reader.stream_position()?;
        let err = match ArrayD::<f64>::read_npy(&mut reader) {
            Ok(array) => return into_matrix(array),
            Err(err) => err,
        };

        type ReadAs<R> = fn(&mut R, u64) -> Result<Option<ArrayD<f64>>, FormatError>;
        let fallbacks: [ReadAs<R>; 10] = [
            read_as::<f32, R>,
            read_as::<i64, R>,
            read_as::<i32, R>,
            read_as::<i16, R>,
            read_as::<i8, R>,
            read_as::<u64, R>,
            read_as::<u32, R>,
            read_as::<u16, R>,
            read_as::<u8, R>,
            read_as::<bool, R>,
        ];
        for read in fallbacks {
            if let Some(array) = read(&mut reader, start)? {
                return into_matrix(array);
            }
        }
        Err(err.into())
    }
}

pub(crate) fn into_matrix(array: ArrayD<f64>) -> Result<FeatureMatrix, FormatError> {
    let ndim = array.ndim();
    array
        .into_dimensionality::<Ix2>()
        .map_err(|_| FormatError::Dimensionality {
            expected: 2,
            found: ndim,
        })
}
