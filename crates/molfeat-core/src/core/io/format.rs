use std::path::Path;

/// The on-disk formats accepted for molecule-level features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFormat {
    /// Compressed NumPy archive with a `features` member.
    Npz,
    /// Raw NumPy array file.
    Npy,
    /// Comma-separated text with a header line.
    Delimited,
    /// Pickled list of sparse matrices.
    SparsePickle,
}

impl FeatureFormat {
    /// Maps a file extension (including the leading dot) to a format.
    ///
    /// Matching is exact: `.NPZ` is not recognized.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".npz" => Some(Self::Npz),
            ".npy" => Some(Self::Npy),
            ".csv" | ".txt" => Some(Self::Delimited),
            ".pkl" | ".pckl" | ".pickle" => Some(Self::SparsePickle),
            _ => None,
        }
    }
}

/// The on-disk formats accepted for atom-level features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomFeatureFormat {
    /// Pickled table whose cells are numeric blocks.
    PickleTable,
    /// Structure-data file whose data fields hold comma-separated descriptors.
    StructureData,
}

impl AtomFeatureFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".pkl" | ".pckl" | ".pickle" => Some(Self::PickleTable),
            ".sdf" => Some(Self::StructureData),
            _ => None,
        }
    }
}

/// Returns the extension of the final path component, including the leading dot.
///
/// Files without an extension, and dot-files such as `.npz`, yield an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
