//! # Workflows Module
//!
//! The public entry points of the library. Each function resolves the file
//! format from the path, runs the matching decoder from [`crate::core::io`] and
//! assembles the arrays callers consume.
//!
//! - **Molecule features** ([`features`]) - [`save_features`] and [`load_features`].
//! - **Atom descriptors** ([`atom_features`]) - [`load_valid_atom_features`], with
//!   column selection and short-list handling set through [`config`].
//!
//! All failures surface as [`FeatureError`].

pub mod atom_features;
pub mod config;
pub mod error;
pub mod features;

pub use atom_features::{load_valid_atom_features, load_valid_atom_features_with};
pub use config::{
    AtomDescriptorConfig, AtomDescriptorConfigBuilder, ConfigError, DescriptorColumns,
    ShortVectorPolicy,
};
pub use error::FeatureError;
pub use features::{load_features, npz_path, save_features};
