use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::element::Element;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("atom {atom} ({element}, charge {charge}): valence {valence} not in {allowed:?}")]
pub struct ValenceError {
    pub atom: usize,
    pub element: Element,
    pub charge: i8,
    pub valence: u8,
    pub allowed: Vec<u8>,
}

/// Valences an atom may take. Neutral atoms use the element's default list;
/// a charged atom behaves like the isoelectronic neutral atom, so `[N+]` is
/// tetravalent like carbon and `[O-]` monovalent like fluorine.
pub fn allowed_valences(element: Element, charge: i8) -> Vec<u8> {
    if charge == 0 {
        return element.default_valences().to_vec();
    }
    let electrons = i16::from(element.outer_shell_electrons()) - i16::from(charge);
    if !(0..=8).contains(&electrons) {
        return Vec::new();
    }
    let v = if electrons <= 4 { electrons } else { 8 - electrons };
    vec![v as u8]
}

/// Sum of bond orders at `atom`, counting aromatic bonds as one.
pub fn explicit_valence(mol: &Mol, atom: NodeIndex) -> u8 {
    mol.reader_bond_order_sum(atom)
}

/// Implicit hydrogens the SMILES reader gives a bare (non-bracket) atom.
///
/// The lowest default valence that accommodates the bonds wins; an aromatic
/// atom gives one unit of that valence to the pi system.
pub fn bare_implicit_hydrogens(element: Element, is_aromatic: bool, bond_order_sum: u8) -> u8 {
    let Some(&target) = element
        .default_valences()
        .iter()
        .find(|&&v| v >= bond_order_sum)
    else {
        return 0;
    };
    let h = target - bond_order_sum;
    if is_aromatic {
        h.saturating_sub(1)
    } else {
        h
    }
}

/// Recomputes implicit hydrogens for every non-bracket atom of a kekulized
/// molecule and checks every atom against its allowed valences.
///
/// Bracket atoms keep their hydrogen count. They must sit exactly on an
/// allowed valence, or below the lowest one (a radical).
pub fn assign_implicit_hydrogens(mol: &mut Mol) -> Result<(), ValenceError> {
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        let bonds = explicit_valence(mol, idx);
        let atom = mol.atom(idx);
        let allowed = allowed_valences(atom.element, atom.formal_charge);
        let error = |valence: u8| ValenceError {
            atom: idx.index(),
            element: atom.element,
            charge: atom.formal_charge,
            valence,
            allowed: allowed.clone(),
        };

        if atom.no_implicit {
            let total = bonds + atom.explicit_hydrogens;
            let radical = allowed.first().is_some_and(|&v| total < v);
            if !radical && !allowed.contains(&total) {
                return Err(error(total));
            }
            continue;
        }

        let needed = bonds + atom.explicit_hydrogens;
        let Some(&target) = allowed.iter().find(|&&v| v >= needed) else {
            return Err(error(needed));
        };
        mol.atom_mut(idx).implicit_hydrogens = target - needed;
    }
    Ok(())
}
