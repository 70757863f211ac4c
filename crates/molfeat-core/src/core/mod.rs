//! # Core Module
//!
//! Stateless building blocks shared by every workflow.
//!
//! - **Models** ([`models`]) - Feature matrices, atom descriptor blocks and the
//!   string tables read from structure-data files.
//! - **I/O** ([`io`]) - One reader or writer per on-disk format, behind the
//!   [`io::traits::FeatureReader`] and [`io::traits::FeatureWriter`] traits.
//! - **Chemistry** ([`chem`]) - The atom-count capability used to cut per-atom
//!   descriptor lists to size.

pub mod chem;
pub mod io;
pub mod models;
