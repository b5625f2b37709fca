use thiserror::Error;
use tracing::trace;

use crate::aromaticity::perceive_aromaticity;
use crate::kekulize::{kekulize, KekulizeError};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::valence::{assign_implicit_hydrogens, ValenceError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error(transparent)]
    Valence(#[from] ValenceError),
}

/// Brings a molecule into its checked, canonical-ready form.
///
/// 1. Aromatic bonds are kekulized and aromatic flags cleared.
/// 2. Implicit hydrogens are recomputed and every atom's valence checked.
/// 3. Rings are perceived and ring membership recorded on each atom.
/// 4. Aromaticity is perceived again from the Kekulé structure.
///
/// The result has aromatic rings marked, so a Kekulé and an aromatic
/// spelling of the same molecule sanitize to the same graph.
pub fn sanitize(mut mol: Mol) -> Result<Mol, SanitizeError> {
    kekulize(&mut mol)?;
    assign_implicit_hydrogens(&mut mol)?;

    let rings = RingInfo::sssr(&mol);
    let atoms: Vec<_> = mol.atoms().collect();
    for idx in atoms {
        mol.atom_mut(idx).is_in_ring = rings.is_ring_atom(idx);
    }
    perceive_aromaticity(&mut mol, &rings);

    trace!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        rings = rings.num_rings(),
        "sanitized molecule"
    );
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use crate::smiles::parse_smiles;
    use petgraph::graph::NodeIndex;

    fn sanitized(smiles: &str) -> Result<Mol, SanitizeError> {
        sanitize(parse_smiles(smiles).unwrap())
    }

    #[test]
    fn kekule_benzene_becomes_aromatic() {
        let mol = sanitized("C1=CC=CC=C1").unwrap();
        assert!(mol.atoms().all(|v| mol.atom(v).is_aromatic && mol.atom(v).is_in_ring));
        assert!(mol.bonds().all(|e| mol.bond(e).order == BondOrder::Aromatic));
        assert!(mol.atoms().all(|v| mol.atom(v).total_hydrogens() == 1));
    }

    #[test]
    fn ring_membership() {
        let mol = sanitized("CC1CC1").unwrap();
        assert!(!mol.atom(NodeIndex::new(0)).is_in_ring);
        assert!(mol.atom(NodeIndex::new(1)).is_in_ring);
    }

    #[test]
    fn pyrrole_keeps_bracket_hydrogen() {
        let mol = sanitized("c1cc[nH]c1").unwrap();
        let n = mol.atom(NodeIndex::new(3));
        assert!(n.is_aromatic);
        assert_eq!(n.total_hydrogens(), 1);
    }

    #[test]
    fn hypervalent_carbon_rejected() {
        assert!(matches!(
            sanitized("C(C)(C)(C)(C)C"),
            Err(SanitizeError::Valence(_))
        ));
    }

    #[test]
    fn unkekulizable_rejected() {
        assert!(matches!(sanitized("c1cccc1"), Err(SanitizeError::Kekulize(_))));
    }

    #[test]
    fn implicit_hydrogens_follow_bonds() {
        let mol = sanitized("CC=O").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(0)).total_hydrogens(), 3);
        assert_eq!(mol.atom(NodeIndex::new(1)).total_hydrogens(), 1);
        assert_eq!(mol.atom(NodeIndex::new(2)).total_hydrogens(), 0);
    }
}
