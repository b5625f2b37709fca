use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::BondOrder;
use crate::canonical::canonical_ranks;
use crate::graph_ops::connected_components;
use crate::mol::Mol;
use crate::valence::bare_implicit_hydrogens;

/// Writes the canonical SMILES of a sanitized molecule.
///
/// Each fragment is written depth-first from its lowest-ranked atom with
/// neighbours visited in rank order; fragments are then sorted and joined
/// with `.`. The empty molecule writes as the empty string.
pub fn to_canonical_smiles(mol: &Mol) -> String {
    let ranks = canonical_ranks(mol);
    let mut parts: Vec<String> = connected_components(mol)
        .iter()
        .map(|component| write_fragment(mol, component, &ranks))
        .collect();
    parts.sort();
    parts.join(".")
}

struct RingBond {
    edge: EdgeIndex,
    order: BondOrder,
    other: NodeIndex,
}

struct DfsTree {
    children: Vec<Vec<NodeIndex>>,
    ring_opens: Vec<Vec<RingBond>>,
    ring_closes: Vec<Vec<RingBond>>,
}

fn write_fragment(mol: &Mol, component: &[NodeIndex], ranks: &[usize]) -> String {
    let Some(&start) = component.iter().min_by_key(|&&node| ranks[node.index()]) else {
        return String::new();
    };
    let tree = build_dfs_tree(mol, start, ranks);
    let mut writer = FragmentWriter {
        mol,
        tree: &tree,
        digits: HashMap::new(),
        in_use: [false; 100],
        out: String::new(),
    };
    writer.write_node(start);
    writer.out
}

fn build_dfs_tree(mol: &Mol, start: NodeIndex, ranks: &[usize]) -> DfsTree {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut preorder = vec![usize::MAX; n];
    let mut parent = vec![None::<NodeIndex>; n];
    let mut edge_used = vec![false; mol.bond_count()];
    let mut tree = DfsTree {
        children: vec![Vec::new(); n],
        ring_opens: (0..n).map(|_| Vec::new()).collect(),
        ring_closes: (0..n).map(|_| Vec::new()).collect(),
    };

    let neighbor_lists: Vec<Vec<NodeIndex>> = mol
        .atoms()
        .map(|v| {
            let mut neighbors: Vec<NodeIndex> = mol.neighbors(v).collect();
            neighbors.sort_by_key(|nb| ranks[nb.index()]);
            neighbors
        })
        .collect();

    let mut counter = 0;
    visited[start.index()] = true;
    preorder[start.index()] = counter;
    let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];

    while let Some((node, next)) = stack.last_mut() {
        let node = *node;
        let neighbors = &neighbor_lists[node.index()];
        let Some(&neighbor) = neighbors.get(*next) else {
            stack.pop();
            continue;
        };
        *next += 1;
        let Some(edge) = mol.bond_between(node, neighbor) else {
            continue;
        };
        if edge_used[edge.index()] {
            continue;
        }
        edge_used[edge.index()] = true;

        if visited[neighbor.index()] {
            if parent[node.index()] == Some(neighbor) {
                continue;
            }
            let order = mol.bond(edge).order;
            tree.ring_opens[neighbor.index()].push(RingBond { edge, order, other: node });
            tree.ring_closes[node.index()].push(RingBond { edge, order, other: neighbor });
        } else {
            counter += 1;
            visited[neighbor.index()] = true;
            preorder[neighbor.index()] = counter;
            parent[neighbor.index()] = Some(node);
            tree.children[node.index()].push(neighbor);
            stack.push((neighbor, 0));
        }
    }

    for list in tree.ring_opens.iter_mut().chain(tree.ring_closes.iter_mut()) {
        list.sort_by_key(|rb| preorder[rb.other.index()]);
    }
    tree
}

struct FragmentWriter<'a> {
    mol: &'a Mol,
    tree: &'a DfsTree,
    digits: HashMap<EdgeIndex, usize>,
    in_use: [bool; 100],
    out: String,
}

impl FragmentWriter<'_> {
    fn write_node(&mut self, node: NodeIndex) {
        let tree = self.tree;
        write_atom(self.mol, node, &mut self.out);

        let mut released = Vec::new();
        for rb in &tree.ring_closes[node.index()] {
            if let Some(digit) = self.digits.remove(&rb.edge) {
                write_ring_digit(digit, &mut self.out);
                released.push(digit);
            }
        }
        for rb in &tree.ring_opens[node.index()] {
            let digit = (1..100).find(|&d| !self.in_use[d]).unwrap_or(99);
            self.in_use[digit] = true;
            self.digits.insert(rb.edge, digit);
            write_bond(self.mol, rb.order, node, rb.other, &mut self.out);
            write_ring_digit(digit, &mut self.out);
        }
        for digit in released {
            self.in_use[digit] = false;
        }

        let kids = &tree.children[node.index()];
        let last = kids.len().saturating_sub(1);
        for (i, &child) in kids.iter().enumerate() {
            let is_branch = i < last;
            if is_branch {
                self.out.push('(');
            }
            if let Some(edge) = self.mol.bond_between(node, child) {
                write_bond(self.mol, self.mol.bond(edge).order, node, child, &mut self.out);
            }
            self.write_node(child);
            if is_branch {
                self.out.push(')');
            }
        }
    }
}

/// Bond symbols are written only where the reader would otherwise infer a
/// different bond: `-` between two aromatic atoms, nothing for a bond inside
/// an aromatic ring.
fn write_bond(mol: &Mol, order: BondOrder, from: NodeIndex, to: NodeIndex, out: &mut String) {
    let both_aromatic = mol.atom(from).is_aromatic && mol.atom(to).is_aromatic;
    match order {
        BondOrder::Single if both_aromatic => out.push('-'),
        BondOrder::Single => {}
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
        BondOrder::Aromatic if both_aromatic => {}
        BondOrder::Aromatic => out.push(':'),
    }
}

fn write_ring_digit(digit: usize, out: &mut String) {
    if digit <= 9 {
        out.push_str(&digit.to_string());
    } else {
        out.push('%');
        out.push_str(&format!("{digit:02}"));
    }
}

fn write_atom(mol: &Mol, node: NodeIndex, out: &mut String) {
    let atom = mol.atom(node);
    if can_write_bare(mol, node) {
        push_symbol(atom, out);
    } else {
        write_bracket_atom(atom, out);
    }
}

/// A bare atom is only written when reading it back yields the same
/// hydrogen count.
fn can_write_bare(mol: &Mol, node: NodeIndex) -> bool {
    let atom = mol.atom(node);
    if !atom.element.is_organic_subset() || atom.isotope != 0 || atom.formal_charge != 0 {
        return false;
    }
    let expected = bare_implicit_hydrogens(
        atom.element,
        atom.is_aromatic,
        mol.reader_bond_order_sum(node),
    );
    atom.total_hydrogens() == expected
}

fn push_symbol(atom: &Atom, out: &mut String) {
    let symbol = atom.element.symbol();
    if atom.is_aromatic {
        out.push_str(&symbol.to_ascii_lowercase());
    } else {
        out.push_str(symbol);
    }
}

fn write_bracket_atom(atom: &Atom, out: &mut String) {
    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    push_symbol(atom, out);

    match atom.total_hydrogens() {
        0 => {}
        1 => out.push('H'),
        h => {
            out.push('H');
            out.push_str(&h.to_string());
        }
    }

    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => out.push_str(&format!("+{c}")),
        c => out.push_str(&format!("-{}", c.unsigned_abs())),
    }
    out.push(']');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize;
    use crate::smiles::parse_smiles;

    fn canonical(smiles: &str) -> String {
        to_canonical_smiles(&sanitize(parse_smiles(smiles).unwrap()).unwrap())
    }

    #[test]
    fn empty_molecule() {
        assert_eq!(to_canonical_smiles(&Mol::new()), "");
    }

    #[test]
    fn small_molecules() {
        assert_eq!(canonical("C"), "C");
        assert_eq!(canonical("OCC"), "CCO");
        assert_eq!(canonical("O=CC"), "CC=O");
        assert_eq!(canonical("C#C"), "C#C");
        assert_eq!(canonical("OC"), "CO");
    }

    #[test]
    fn acids() {
        assert_eq!(canonical("OC(=O)C"), "CC(=O)O");
        assert_eq!(canonical("c1ccccc1C(=O)O"), "O=C(O)c1ccccc1");
        assert_eq!(canonical("OC(=O)C1=CC=CC=C1"), "O=C(O)c1ccccc1");
    }

    #[test]
    fn aromatic_rings() {
        assert_eq!(canonical("C1=CC=CC=C1"), "c1ccccc1");
        assert_eq!(canonical("[nH]1cccc1"), "c1cc[nH]c1");
        assert_eq!(canonical("C1=CC=NC=C1"), "c1ccncc1");
    }

    #[test]
    fn saturated_ring() {
        assert_eq!(canonical("C1CCCCC1"), "C1CCCCC1");
        assert_eq!(canonical("C1CC1"), "C1CC1");
    }

    #[test]
    fn charged_and_isotopic_atoms() {
        assert_eq!(canonical("[NH4+]"), "[NH4+]");
        assert_eq!(canonical("[O-]C"), "C[O-]");
        assert_eq!(canonical("[13CH4]"), "[13CH4]");
    }

    #[test]
    fn single_bond_between_aromatic_rings() {
        let s = canonical("c1ccccc1-c1ccccc1");
        assert!(s.contains("-c"), "{s}");
        assert_eq!(s, canonical("C1=CC=C(C=C1)C1=CC=CC=C1"));
    }

    #[test]
    fn fragments_sorted() {
        assert_eq!(canonical("O.CC"), "CC.O");
        assert_eq!(canonical("CC.O"), "CC.O");
    }

    #[test]
    fn ring_digits_reused() {
        let s = canonical("C1CC1C1CC1");
        assert_eq!(s.matches('2').count(), 0, "{s}");
    }

    #[test]
    fn output_reads_back_identically() {
        for smiles in [
            "CC(C)(C)C",
            "c1ccc2ccccc2c1",
            "C1CC2CCC1C2",
            "O=c1cccc[nH]1",
            "Cn1cnc2c1c(=O)n(c(=O)n2C)C",
            "C=CC#N",
            "c1ccc2cccc2cc1",
        ] {
            let once = canonical(smiles);
            assert_eq!(canonical(&once), once, "{smiles}");
        }
    }
}
