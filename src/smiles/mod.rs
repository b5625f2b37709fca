mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use crate::mol::Mol;
pub use error::SmilesError;
pub use writer::to_canonical_smiles;

/// Reads a SMILES string into a molecular graph without sanitizing it.
///
/// Aromatic bonds stay `Aromatic` and bare atoms get the hydrogens the
/// reader assigns them. Run the result through
/// [`sanitize`](crate::sanitize::sanitize) before editing it.
pub fn parse_smiles(s: &str) -> Result<Mol, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::BondOrder;
    use crate::element::Element;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn atom(mol: &Mol, i: usize) -> &Atom {
        mol.atom(n(i))
    }

    #[test]
    fn methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).element, Element::C);
        assert_eq!(atom(&mol, 0).total_hydrogens(), 4);
    }

    #[test]
    fn ethyne() {
        let mol = parse_smiles("C#C").unwrap();
        assert_eq!(atom(&mol, 0).total_hydrogens(), 1);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Triple);
    }

    #[test]
    fn halides_and_chalcogens() {
        for (smiles, element, h) in [
            ("O", Element::O, 2),
            ("N", Element::N, 3),
            ("F", Element::F, 1),
            ("Cl", Element::Cl, 1),
            ("Br", Element::Br, 1),
            ("I", Element::I, 1),
            ("S", Element::S, 2),
            ("P", Element::P, 3),
            ("B", Element::B, 3),
        ] {
            let mol = parse_smiles(smiles).unwrap();
            assert_eq!(atom(&mol, 0).element, element, "{smiles}");
            assert_eq!(atom(&mol, 0).total_hydrogens(), h, "{smiles}");
        }
    }

    #[test]
    fn isobutane() {
        let mol = parse_smiles("CC(C)C").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(atom(&mol, 1).total_hydrogens(), 1);
        assert_eq!(atom(&mol, 3).total_hydrogens(), 3);
    }

    #[test]
    fn neopentane() {
        let mol = parse_smiles("CC(C)(C)C").unwrap();
        assert_eq!(mol.bond_count(), 4);
        assert_eq!(atom(&mol, 1).total_hydrogens(), 0);
    }

    #[test]
    fn cyclohexane() {
        let mol = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        for i in 0..6 {
            assert_eq!(atom(&mol, i).total_hydrogens(), 2);
        }
    }

    #[test]
    fn multi_digit_ring() {
        let mol = parse_smiles("C%10CC%10").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 3);
    }

    #[test]
    fn bicyclo() {
        let mol = parse_smiles("C1CC2C1CC2").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 7);
    }

    #[test]
    fn ammonium() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 0).total_hydrogens(), 4);
    }

    #[test]
    fn oxide_anion() {
        let mol = parse_smiles("[O-]").unwrap();
        assert_eq!(atom(&mol, 0).formal_charge, -1);
        assert_eq!(atom(&mol, 0).total_hydrogens(), 0);
    }

    #[test]
    fn carbon_13() {
        let mol = parse_smiles("[13C]").unwrap();
        assert_eq!(atom(&mol, 0).isotope, 13);
        assert_eq!(atom(&mol, 0).element, Element::C);
    }

    #[test]
    fn pyridine() {
        let mol = parse_smiles("c1ccncc1").unwrap();
        assert_eq!(atom(&mol, 3).element, Element::N);
        assert_eq!(atom(&mol, 3).total_hydrogens(), 0);
        for i in [0, 1, 2, 4, 5] {
            assert_eq!(atom(&mol, i).total_hydrogens(), 1);
        }
    }

    #[test]
    fn pyrrole() {
        let mol = parse_smiles("[nH]1cccc1").unwrap();
        assert_eq!(atom(&mol, 0).explicit_hydrogens, 1);
        assert_eq!(atom(&mol, 0).implicit_hydrogens, 0);
        for i in 1..5 {
            assert_eq!(atom(&mol, i).total_hydrogens(), 1);
        }
    }

    #[test]
    fn thiophene() {
        let mol = parse_smiles("s1cccc1").unwrap();
        assert_eq!(atom(&mol, 0).element, Element::S);
        assert_eq!(atom(&mol, 0).total_hydrogens(), 0);
    }

    #[test]
    fn phenol_ring_bond_is_single() {
        let mol = parse_smiles("Oc1ccccc1").unwrap();
        assert_eq!(atom(&mol, 0).total_hydrogens(), 1);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Single);
    }

    #[test]
    fn nitro_group() {
        let mol = parse_smiles("C[N+](=O)[O-]").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(atom(&mol, 1).formal_charge, 1);
    }

    #[test]
    fn dmso() {
        let mol = parse_smiles("CS(=O)C").unwrap();
        assert_eq!(atom(&mol, 1).total_hydrogens(), 0);
    }

    #[test]
    fn chirality_is_dropped() {
        let mol = parse_smiles("[C@@H](F)(Cl)Br").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(atom(&mol, 0).total_hydrogens(), 1);
    }

    #[test]
    fn caffeine_atom_count() {
        let mol = parse_smiles("Cn1cnc2c1c(=O)n(c(=O)n2C)C").unwrap();
        assert_eq!(mol.atom_count(), 14);
    }

    #[test]
    fn disconnected_ions() {
        let mol = parse_smiles("[NH4+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn error_cases() {
        for bad in ["", "   ", "C(C", "C)C", "C1CC", "X", "[C", "[Fe]", "C==C"] {
            assert!(parse_smiles(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn empty_input_variant() {
        assert!(matches!(parse_smiles(" "), Err(SmilesError::EmptyInput)));
    }
}
