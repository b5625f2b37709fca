use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::smiles::parse_tree::ParseTree;
use crate::smiles::tokenizer::BondToken;
use crate::valence::bare_implicit_hydrogens;

/// Turns a parse tree into a molecule with aromatic bonds still marked
/// `Aromatic` and hydrogen counts as the reader sees them.
pub fn build_mol(tree: &ParseTree) -> Mol {
    let mut mol = Mol::new();
    let nodes: Vec<NodeIndex> = tree
        .atoms
        .iter()
        .map(|tok| {
            mol.add_atom(Atom {
                formal_charge: tok.charge,
                isotope: tok.isotope,
                explicit_hydrogens: tok.hcount.unwrap_or(0),
                no_implicit: tok.is_bracket(),
                is_aromatic: tok.is_aromatic,
                ..Atom::new(tok.element)
            })
        })
        .collect();

    for edge in &tree.edges {
        let order = resolve_bond_order(
            edge.bond,
            tree.atoms[edge.a].is_aromatic,
            tree.atoms[edge.b].is_aromatic,
        );
        mol.add_bond(nodes[edge.a], nodes[edge.b], Bond::new(order));
    }

    for &node in &nodes {
        let atom = mol.atom(node);
        if atom.no_implicit {
            continue;
        }
        let h = bare_implicit_hydrogens(
            atom.element,
            atom.is_aromatic,
            mol.reader_bond_order_sum(node),
        );
        mol.atom_mut(node).implicit_hydrogens = h;
    }

    mol
}

fn resolve_bond_order(bond: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> BondOrder {
    match bond {
        Some(BondToken::Single) | Some(BondToken::Directional) => BondOrder::Single,
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}
