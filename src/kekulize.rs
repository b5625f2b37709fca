//! Kekulization assigns alternating single and double bonds to aromatic
//! ring systems.
//!
//! Aromatic bonds become `Single` or `Double` so that every atom needing a
//! pi bond receives exactly one, via augmenting-path matching with an
//! exhaustive fallback for fused systems the greedy pass misses. Atom
//! aromaticity flags are cleared; [`sanitize`](crate::sanitize::sanitize)
//! perceives them again afterwards.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::bond::BondOrder;
use crate::mol::Mol;
use crate::valence::allowed_valences;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    /// The listed atoms (by index) could not be assigned a double bond.
    #[error("cannot kekulize aromatic system: unmatched atoms {0:?}")]
    Unkekulizable(Vec<usize>),
    #[error("atom {0} is marked aromatic but has no aromatic bonds")]
    NonRingAromatic(usize),
}

type Adjacency = Vec<Vec<(NodeIndex, EdgeIndex)>>;

/// Replaces every aromatic bond of `mol` with a concrete single or double
/// bond. Molecules without aromatic bonds only have their flags cleared.
pub fn kekulize(mol: &mut Mol) -> Result<(), KekulizeError> {
    let n = mol.atom_count();
    let mut aromatic_adj: Adjacency = vec![vec![]; n];
    for e in mol.bonds() {
        if mol.bond(e).order != BondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(e) {
            aromatic_adj[a.index()].push((b, e));
            aromatic_adj[b.index()].push((a, e));
        }
    }

    if let Some(stray) = mol
        .atoms()
        .find(|&v| mol.atom(v).is_aromatic && aromatic_adj[v.index()].is_empty())
    {
        return Err(KekulizeError::NonRingAromatic(stray.index()));
    }

    let components = aromatic_components(mol, &aromatic_adj);
    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|v| !aromatic_adj[v.index()].is_empty() && needs_pi_bond(mol, v))
        .collect();

    let mut matched_edge: Vec<Option<EdgeIndex>> = vec![None; n];
    for comp in &components {
        let candidates: Vec<NodeIndex> = comp
            .iter()
            .copied()
            .filter(|&v| needs_double[v.index()])
            .collect();

        for &start in &candidates {
            if matched_edge[start.index()].is_none() {
                augment(mol, &aromatic_adj, &needs_double, &mut matched_edge, start);
            }
        }

        if candidates.iter().any(|&v| matched_edge[v.index()].is_none()) {
            for &v in comp {
                matched_edge[v.index()] = None;
            }
            exhaustive_match(&aromatic_adj, &needs_double, &mut matched_edge, &candidates);
        }

        let unmatched: Vec<usize> = candidates
            .iter()
            .filter(|&&v| matched_edge[v.index()].is_none())
            .map(|v| v.index())
            .collect();
        if !unmatched.is_empty() {
            return Err(KekulizeError::Unkekulizable(unmatched));
        }
    }

    let aromatic_edges: Vec<EdgeIndex> = mol
        .bonds()
        .filter(|&e| mol.bond(e).order == BondOrder::Aromatic)
        .collect();
    for e in aromatic_edges {
        let order = if matched_edge.contains(&Some(e)) {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
        mol.bond_mut(e).order = order;
    }
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for v in atoms {
        mol.atom_mut(v).is_aromatic = false;
    }
    Ok(())
}

fn aromatic_components(mol: &Mol, aromatic_adj: &Adjacency) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut seen = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if aromatic_adj[node.index()].is_empty() || seen[node.index()] {
            continue;
        }
        let mut stack = vec![node];
        let mut comp = Vec::new();
        while let Some(v) = stack.pop() {
            if seen[v.index()] {
                continue;
            }
            seen[v.index()] = true;
            comp.push(v);
            stack.extend(
                aromatic_adj[v.index()]
                    .iter()
                    .map(|&(w, _)| w)
                    .filter(|w| !seen[w.index()]),
            );
        }
        components.push(comp);
    }
    components
}

/// An atom needs a pi bond when it sits exactly one unit below its target
/// valence, or is a hydrogen-free charged atom two units below (`[n+]`).
fn needs_pi_bond(mol: &Mol, v: NodeIndex) -> bool {
    let atom = mol.atom(v);
    let used = mol.reader_bond_order_sum(v) + atom.total_hydrogens();
    let Some(&target) = allowed_valences(atom.element, atom.formal_charge)
        .iter()
        .find(|&&t| t >= used)
    else {
        return false;
    };
    let gap = target - used;
    let bare_charged = gap == 2 && atom.total_hydrogens() == 0 && atom.formal_charge != 0;
    gap == 1 || bare_charged
}

fn augment(
    mol: &Mol,
    aromatic_adj: &Adjacency,
    needs_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    start: NodeIndex,
) -> bool {
    let n = mol.atom_count();
    let mut prev: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();

    visited[start.index()] = true;
    queue.push_back(start);

    while let Some(u) = queue.pop_front() {
        for &(v, e) in &aromatic_adj[u.index()] {
            if !needs_double[v.index()] || visited[v.index()] {
                continue;
            }
            if Some(e) == matched_edge[u.index()] {
                continue;
            }
            visited[v.index()] = true;
            prev[v.index()] = Some((u, e));

            let Some(matched_e) = matched_edge[v.index()] else {
                flip_path(matched_edge, &prev, start, v);
                return true;
            };
            let Some((ea, eb)) = mol.bond_endpoints(matched_e) else {
                continue;
            };
            let w = if ea == v { eb } else { ea };
            if !visited[w.index()] {
                visited[w.index()] = true;
                prev[w.index()] = Some((v, matched_e));
                queue.push_back(w);
            }
        }
    }
    false
}

fn flip_path(
    matched_edge: &mut [Option<EdgeIndex>],
    prev: &[Option<(NodeIndex, EdgeIndex)>],
    start: NodeIndex,
    end: NodeIndex,
) {
    let mut cur = end;
    let mut is_new_match = true;
    while cur != start {
        let Some((p, e)) = prev[cur.index()] else {
            return;
        };
        if is_new_match {
            matched_edge[cur.index()] = Some(e);
            matched_edge[p.index()] = Some(e);
        }
        is_new_match = !is_new_match;
        cur = p;
    }
}

/// Backtracking perfect matching over `candidates`.
fn exhaustive_match(
    aromatic_adj: &Adjacency,
    needs_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    candidates: &[NodeIndex],
) -> bool {
    let Some(&v) = candidates
        .iter()
        .find(|&&v| matched_edge[v.index()].is_none())
    else {
        return true;
    };
    for &(w, e) in &aromatic_adj[v.index()] {
        if !needs_double[w.index()] || matched_edge[w.index()].is_some() {
            continue;
        }
        matched_edge[v.index()] = Some(e);
        matched_edge[w.index()] = Some(e);
        if exhaustive_match(aromatic_adj, needs_double, matched_edge, candidates) {
            return true;
        }
        matched_edge[v.index()] = None;
        matched_edge[w.index()] = None;
    }
    false
}
