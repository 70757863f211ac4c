//! Chemistry capabilities needed by the loaders.
//!
//! The only structural question the loaders ask about a molecule is how many
//! atoms it has, so that per-atom descriptor lists can be cut to length. That
//! question is answered through the [`AtomCounter`] trait, which keeps the
//! loaders independent of any particular chemistry backend.

pub mod elements;
pub mod smiles;

pub use smiles::{SmilesError, SmilesErrorKind, count_atoms};

/// Reports the number of atoms in a molecule given by its SMILES.
pub trait AtomCounter {
    /// # Errors
    ///
    /// Returns a [`SmilesError`] if the identifier cannot be interpreted.
    fn atom_count(&self, smiles: &str) -> Result<usize, SmilesError>;
}

impl<F> AtomCounter for F
where
    F: Fn(&str) -> Result<usize, SmilesError>,
{
    fn atom_count(&self, smiles: &str) -> Result<usize, SmilesError> {
        self(smiles)
    }
}

/// Counts heavy atoms by parsing SMILES syntax with [`count_atoms`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesAtomCounter;

impl AtomCounter for SmilesAtomCounter {
    fn atom_count(&self, smiles: &str) -> Result<usize, SmilesError> {
        count_atoms(smiles)
    }
}
