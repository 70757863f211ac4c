//! Provides input/output functionality for feature file formats.
//!
//! Each submodule implements one on-disk format behind the [`traits::FeatureReader`]
//! and [`traits::FeatureWriter`] interfaces; [`format`] maps file extensions to
//! those formats.

pub mod delimited;
pub mod error;
pub mod format;
pub mod npy;
pub mod npz;
pub mod pickle;
pub mod sdf;
pub mod traits;

pub use error::FormatError;
