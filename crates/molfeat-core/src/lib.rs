//! # molfeat
//!
//! Persistence and loading of precomputed molecular features: per-molecule
//! feature vectors and per-atom descriptor blocks, read from and written to the
//! file formats produced by NumPy, pandas and RDKit tooling.
//!
//! ## Architecture
//!
//! The library has two layers.
//!
//! - **[`core`]: The Foundation.** Data models (`FeatureMatrix`, `DescriptorTable`),
//!   one codec per file format, and the SMILES atom counter.
//!
//! - **[`workflows`]: The Public API.** Extension dispatch and assembly of the
//!   final arrays: [`workflows::save_features`], [`workflows::load_features`] and
//!   [`workflows::load_valid_atom_features`].

pub mod core;
pub mod workflows;
