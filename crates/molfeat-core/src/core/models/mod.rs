//! # Core Models Module
//!
//! In-memory representations of the feature data that moves through the loaders.
//!
//! ## Key Components
//!
//! - [`features`] - Molecule-level feature matrices, per-atom feature blocks and
//!   the stacking helpers that assemble them
//! - [`table`] - String and numeric tables decoded from structure-data files and
//!   serialized atom-feature tables
//!
//! Every value here is transient: it is produced by one loader call and handed to
//! the caller, never cached or persisted by the library.

pub mod features;
pub mod table;
