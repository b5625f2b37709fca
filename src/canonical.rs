//! Canonical atom ranking.
//!
//! Atoms start from an ordered invariant, are refined by their neighbours'
//! ranks until the partition is stable, and remaining ties are broken one
//! class at a time. Every candidate in the lowest tied class is tried and
//! the one whose refined edge trace is smallest wins, so the result does not
//! depend on input atom order.

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::element::Element;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct AtomInvariant {
    degree: usize,
    element: Element,
    isotope: u16,
    formal_charge: i8,
    total_hydrogens: u8,
    is_aromatic: bool,
    is_in_ring: bool,
    bond_orders: Vec<BondOrder>,
}

type Adjacency = Vec<Vec<(usize, BondOrder)>>;
type Trace = Vec<(usize, usize, BondOrder)>;

fn atom_invariant(mol: &Mol, idx: NodeIndex) -> AtomInvariant {
    let atom = mol.atom(idx);
    let mut bond_orders: Vec<BondOrder> = mol.bonds_of(idx).map(|e| mol.bond(e).order).collect();
    bond_orders.sort();
    AtomInvariant {
        degree: mol.degree(idx),
        element: atom.element,
        isotope: atom.isotope,
        formal_charge: atom.formal_charge,
        total_hydrogens: atom.total_hydrogens(),
        is_aromatic: atom.is_aromatic,
        is_in_ring: atom.is_in_ring,
        bond_orders,
    }
}

/// A rank in `0..n` for every atom, indexed by `NodeIndex::index()`.
/// All ranks are distinct.
pub fn canonical_ranks(mol: &Mol) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let mut adj: Adjacency = vec![Vec::new(); n];
    for e in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            let order = mol.bond(e).order;
            adj[a.index()].push((b.index(), order));
            adj[b.index()].push((a.index(), order));
        }
    }

    let invariants: Vec<AtomInvariant> = mol.atoms().map(|v| atom_invariant(mol, v)).collect();
    let mut ranks = competition_ranks(&invariants);
    refine(&adj, &mut ranks);

    while let Some(tied) = lowest_tied_rank(&ranks) {
        let class: Vec<usize> = (0..n).filter(|&i| ranks[i] == tied).collect();
        let mut best: Option<(Trace, Vec<usize>)> = None;
        for &candidate in &class {
            let mut trial = ranks.clone();
            for &other in &class {
                if other != candidate {
                    trial[other] = tied + 1;
                }
            }
            refine(&adj, &mut trial);
            let trace = edge_trace(&adj, &trial);
            if best.as_ref().map_or(true, |(t, _)| trace < *t) {
                best = Some((trace, trial));
            }
        }
        match best {
            Some((_, chosen)) => ranks = chosen,
            None => break,
        }
    }
    ranks
}

/// Rank of each key: the number of keys strictly smaller than it.
fn competition_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0; keys.len()];
    for (pos, &i) in order.iter().enumerate() {
        ranks[i] = match pos {
            0 => 0,
            _ if keys[order[pos - 1]] == keys[i] => ranks[order[pos - 1]],
            _ => pos,
        };
    }
    ranks
}

fn distinct(ranks: &[usize]) -> usize {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn refine(adj: &Adjacency, ranks: &mut Vec<usize>) {
    let mut classes = distinct(ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, BondOrder)>)> = adj
            .iter()
            .enumerate()
            .map(|(i, nbs)| {
                let mut env: Vec<(usize, BondOrder)> =
                    nbs.iter().map(|&(j, order)| (ranks[j], order)).collect();
                env.sort();
                (ranks[i], env)
            })
            .collect();
        let next = competition_ranks(&keys);
        let next_classes = distinct(&next);
        *ranks = next;
        if next_classes == classes {
            break;
        }
        classes = next_classes;
    }
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}

fn edge_trace(adj: &Adjacency, ranks: &[usize]) -> Trace {
    let mut trace: Trace = adj
        .iter()
        .enumerate()
        .flat_map(|(i, nbs)| {
            nbs.iter()
                .filter(move |&&(j, _)| i < j)
                .map(move |&(j, order)| {
                    let (a, b) = (ranks[i], ranks[j]);
                    (a.min(b), a.max(b), order)
                })
        })
        .collect();
    trace.sort();
    trace
}
