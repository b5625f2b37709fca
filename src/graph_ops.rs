use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// Atoms on a shortest path from `from` to `to`, both ends included.
pub fn shortest_path(mol: &Mol, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
    if from == to {
        return Some(vec![from]);
    }
    let n = mol.atom_count();
    let mut pred = vec![None; n];
    let mut visited = vec![false; n];
    visited[from.index()] = true;
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        for neighbor in mol.neighbors(current) {
            if visited[neighbor.index()] {
                continue;
            }
            visited[neighbor.index()] = true;
            pred[neighbor.index()] = Some(current);
            if neighbor == to {
                let mut path = vec![to];
                let mut node = to;
                while let Some(p) = pred[node.index()] {
                    path.push(p);
                    node = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(neighbor);
        }
    }
    None
}

/// Number of atoms on a shortest path between `a` and `b`, or 0 when they
/// are disconnected. Closing a bond between them makes a ring this size.
pub fn shortest_path_len(mol: &Mol, a: NodeIndex, b: NodeIndex) -> usize {
    shortest_path(mol, a, b).map_or(0, |path| path.len())
}

/// Atom sets of the connected components, each sorted by index and listed
/// in order of their lowest atom.
pub fn connected_components(mol: &Mol) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            stack.extend(mol.neighbors(current).filter(|nb| !visited[nb.index()]));
        }
        component.sort();
        components.push(component);
    }
    components
}

/// Splits a molecule into one `Mol` per connected component.
pub fn fragments(mol: &Mol) -> Vec<Mol> {
    let components = connected_components(mol);
    if components.len() <= 1 {
        return vec![mol.clone()];
    }
    let mut index_map = vec![NodeIndex::end(); mol.atom_count()];
    components
        .iter()
        .map(|component| {
            let mut frag = Mol::new();
            for &old in component {
                index_map[old.index()] = frag.add_atom(mol.atom(old).clone());
            }
            for e in mol.bonds() {
                let Some((a, b)) = mol.bond_endpoints(e) else {
                    continue;
                };
                if component.binary_search(&a).is_ok() {
                    frag.add_bond(index_map[a.index()], index_map[b.index()], mol.bond(e).clone());
                }
            }
            frag
        })
        .collect()
}
