//! Huckel aromaticity perception over a kekulized molecule.
//!
//! Every simple cycle of conjugation-capable ring atoms, up to
//! [`MAX_SYSTEM_ATOMS`] long, is tested for 4n+2 pi electrons. The cycles
//! depend only on the graph and each atom's pi count only on its own bonds,
//! so all Kekulé layouts of a molecule are perceived alike. Fused systems
//! whose member rings fail on their own, like azulene, pass through their
//! perimeter cycle.

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::element::Element;
use crate::mol::Mol;
use crate::rings::RingInfo;

/// Longest cycle tested as a single pi system.
pub const MAX_SYSTEM_ATOMS: usize = 14;

/// Marks atoms of every aromatic cycle, and the bonds of every cycle made
/// only of aromatic atoms. Expects the molecule to be kekulized with
/// hydrogens assigned.
pub fn perceive_aromaticity(mol: &mut Mol, rings: &RingInfo) {
    let donors: Vec<Option<u8>> = mol
        .atoms()
        .map(|v| {
            if rings.is_ring_atom(v) {
                pi_electrons(mol, rings, v)
            } else {
                None
            }
        })
        .collect();
    let cycles = conjugated_cycles(mol, &donors);

    let mut aromatic = vec![false; mol.atom_count()];
    for cycle in &cycles {
        let total: u32 = cycle
            .iter()
            .filter_map(|v| donors[v.index()])
            .map(u32::from)
            .sum();
        if total % 4 == 2 {
            for v in cycle {
                aromatic[v.index()] = true;
            }
        }
    }

    for cycle in cycles.iter().filter(|c| c.iter().all(|v| aromatic[v.index()])) {
        let len = cycle.len();
        for k in 0..len {
            if let Some(e) = mol.bond_between(cycle[k], cycle[(k + 1) % len]) {
                mol.bond_mut(e).order = BondOrder::Aromatic;
            }
        }
    }
    let atoms: Vec<NodeIndex> = mol.atoms().filter(|v| aromatic[v.index()]).collect();
    for v in atoms {
        mol.atom_mut(v).is_aromatic = true;
    }
}

/// Simple cycles through atoms with a pi count, each listed once in path
/// order starting from its lowest atom.
fn conjugated_cycles(mol: &Mol, donors: &[Option<u8>]) -> Vec<Vec<NodeIndex>> {
    let mut cycles = Vec::new();
    let mut on_path = vec![false; mol.atom_count()];
    for start in mol.atoms().filter(|v| donors[v.index()].is_some()) {
        let mut path = vec![start];
        on_path[start.index()] = true;
        extend_cycles(mol, donors, &mut path, &mut on_path, &mut cycles);
        on_path[start.index()] = false;
    }
    cycles
}

fn extend_cycles(
    mol: &Mol,
    donors: &[Option<u8>],
    path: &mut Vec<NodeIndex>,
    on_path: &mut [bool],
    cycles: &mut Vec<Vec<NodeIndex>>,
) {
    let (start, last) = match (path.first(), path.last()) {
        (Some(&s), Some(&l)) => (s, l),
        _ => return,
    };
    for next in mol.neighbors(last) {
        if next == start {
            // Found once in each direction; keep one.
            if path.len() >= 3 && path[1] < last {
                cycles.push(path.clone());
            }
            continue;
        }
        if next < start
            || on_path[next.index()]
            || donors[next.index()].is_none()
            || path.len() == MAX_SYSTEM_ATOMS
        {
            continue;
        }
        path.push(next);
        on_path[next.index()] = true;
        extend_cycles(mol, donors, path, on_path, cycles);
        on_path[next.index()] = false;
        path.pop();
    }
}

/// Pi electrons `v` donates to any ring system through it, or `None` if the
/// atom cannot be part of one.
fn pi_electrons(mol: &Mol, rings: &RingInfo, v: NodeIndex) -> Option<u8> {
    let atom = mol.atom(v);
    if !atom.element.is_sp2_capable() {
        return None;
    }

    let mut double_partner = None;
    for e in mol.bonds_of(v) {
        match mol.bond(e).order {
            BondOrder::Triple => return None,
            BondOrder::Double => {
                if double_partner.is_some() {
                    return None;
                }
                let (a, b) = mol.bond_endpoints(e)?;
                double_partner = Some(if a == v { b } else { a });
            }
            BondOrder::Single | BondOrder::Aromatic => {}
        }
    }

    if let Some(w) = double_partner {
        if rings.is_ring_atom(w) {
            return Some(1);
        }
        // Exocyclic carbonyl-like bonds pull the electrons out of the ring.
        return (mol.atom(w).element != Element::C).then_some(0);
    }

    let connections = mol.degree(v) + usize::from(atom.total_hydrogens());
    match (atom.element, atom.formal_charge) {
        (Element::C, -1) => Some(2),
        (Element::C, 1) => Some(0),
        (Element::N | Element::P | Element::As, 0) if connections == 3 => Some(2),
        (Element::N | Element::P | Element::As, -1) if connections == 2 => Some(2),
        (Element::O | Element::S | Element::Se | Element::Te, 0) if connections == 2 => Some(2),
        (Element::B, 0) if connections == 3 => Some(0),
        _ => None,
    }
}
