//! The chemistry backend the enumerator and environment are written against.

use petgraph::graph::NodeIndex;

use crate::element::Element;
use crate::error::InvalidStateError;
use crate::graph_ops;
use crate::kekulize::{self, KekulizeError};
use crate::mol::Mol;
use crate::sanitize::{self, SanitizeError};
use crate::smiles::{parse_smiles, to_canonical_smiles};

/// Chemistry primitives behind the action space.
///
/// Every candidate graph handed to an oracle is an owned clone, so
/// implementations only need to be reentrant.
pub trait ChemicalOracle: Send + Sync {
    /// Parses and sanitizes a serialized state.
    fn parse(&self, state: &str) -> Result<Mol, InvalidStateError>;

    /// Deterministic canonical string, fragments joined with `.`.
    fn canonical_smiles(&self, mol: &Mol) -> String;

    fn sanitize(&self, mol: Mol) -> Result<Mol, SanitizeError>;

    /// A copy of `mol` with aromatic bonds replaced by alternating single and
    /// double bonds and aromatic flags cleared.
    fn kekulize(&self, mol: &Mol) -> Result<Mol, KekulizeError>;

    /// Implicit hydrogens at `atom`: the capacity an edit may spend.
    fn free_valence(&self, mol: &Mol, atom: NodeIndex) -> u8;

    fn is_in_ring(&self, mol: &Mol, atom: NodeIndex) -> bool;

    /// Atoms on a shortest path between `a` and `b`, 0 if disconnected.
    fn shortest_path_len(&self, mol: &Mol, a: NodeIndex, b: NodeIndex) -> usize;

    /// Bonding capacity of a fresh atom of type `label`, `None` if the label
    /// is not an atom type this backend knows.
    fn max_valence(&self, label: &str) -> Option<u8>;
}

/// The built-in SMILES backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesOracle;

impl ChemicalOracle for SmilesOracle {
    fn parse(&self, state: &str) -> Result<Mol, InvalidStateError> {
        let mol = parse_smiles(state).map_err(|source| InvalidStateError::Syntax {
            state: state.to_string(),
            source,
        })?;
        sanitize::sanitize(mol).map_err(|source| InvalidStateError::Chemistry {
            state: state.to_string(),
            source,
        })
    }

    fn canonical_smiles(&self, mol: &Mol) -> String {
        to_canonical_smiles(mol)
    }

    fn sanitize(&self, mol: Mol) -> Result<Mol, SanitizeError> {
        sanitize::sanitize(mol)
    }

    fn kekulize(&self, mol: &Mol) -> Result<Mol, KekulizeError> {
        let mut kekulized = mol.clone();
        kekulize::kekulize(&mut kekulized)?;
        Ok(kekulized)
    }

    fn free_valence(&self, mol: &Mol, atom: NodeIndex) -> u8 {
        mol.atom(atom).implicit_hydrogens
    }

    fn is_in_ring(&self, mol: &Mol, atom: NodeIndex) -> bool {
        mol.atom(atom).is_in_ring
    }

    fn shortest_path_len(&self, mol: &Mol, a: NodeIndex, b: NodeIndex) -> usize {
        graph_ops::shortest_path_len(mol, a, b)
    }

    fn max_valence(&self, label: &str) -> Option<u8> {
        Element::from_symbol(label).map(Element::max_valence)
    }
}
