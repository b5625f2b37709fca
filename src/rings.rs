//! Ring perception: the smallest set of smallest rings.
//!
//! Candidates come from Horton's construction (for every bond and every
//! root atom, the two shortest paths back to the root close a cycle) and
//! are accepted shortest-first while they stay linearly independent over
//! GF(2) in edge space.

use std::collections::VecDeque;

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;

use crate::mol::Mol;

#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr(mol: &Mol) -> Self {
        let wanted = Self::cyclomatic_number(mol);
        if wanted == 0 {
            return Self::default();
        }

        let mut basis = CycleBasis::new(mol.bond_count());
        let mut rings = Vec::with_capacity(wanted);
        for ring in horton_candidates(mol) {
            if rings.len() == wanted {
                break;
            }
            if basis.insert(edge_bits(mol, &ring, basis.words)) {
                rings.push(ring);
            }
        }
        rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        Self { rings }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    /// Rings as atom cycles, each starting at its lowest index.
    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| {
            let len = ring.len();
            (0..len).any(|i| {
                let (x, y) = (ring[i], ring[(i + 1) % len]);
                (x == a && y == b) || (x == b && y == a)
            })
        })
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .map(Vec::len)
            .min()
    }

    /// Bonds minus atoms plus connected components.
    pub fn cyclomatic_number(mol: &Mol) -> usize {
        let components = connected_components(mol.graph());
        (mol.bond_count() + components).saturating_sub(mol.atom_count())
    }
}

/// Shortest-path tree from one root: distances and BFS parents.
struct PathTree {
    dist: Vec<Option<u32>>,
    parent: Vec<Option<NodeIndex>>,
}

impl PathTree {
    fn from_root(mol: &Mol, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut tree = Self {
            dist: vec![None; n],
            parent: vec![None; n],
        };
        tree.dist[root.index()] = Some(0);
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            let d = tree.dist[cur.index()].unwrap_or(0);
            for nb in mol.neighbors(cur) {
                if tree.dist[nb.index()].is_none() {
                    tree.dist[nb.index()] = Some(d + 1);
                    tree.parent[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        tree
    }

    /// Path from `to` back up to the root, `to` first.
    fn path_to_root(&self, to: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![to];
        let mut cur = to;
        while let Some(p) = self.parent[cur.index()] {
            path.push(p);
            cur = p;
        }
        path
    }
}

fn horton_candidates(mol: &Mol) -> Vec<Vec<NodeIndex>> {
    let trees: Vec<PathTree> = mol.atoms().map(|v| PathTree::from_root(mol, v)).collect();
    let mut candidates = Vec::new();

    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for (root_idx, tree) in trees.iter().enumerate() {
            let (Some(du), Some(dv)) = (tree.dist[u.index()], tree.dist[v.index()]) else {
                continue;
            };
            if du + dv + 1 < 3 {
                continue;
            }
            let path_u = tree.path_to_root(u);
            let path_v = tree.path_to_root(v);
            let root = NodeIndex::new(root_idx);
            let shares_inner = path_v
                .iter()
                .filter(|&&x| x != root)
                .any(|x| path_u.contains(x));
            if shares_inner {
                continue;
            }
            let mut ring = path_u;
            ring.reverse();
            ring.extend(path_v.into_iter().filter(|&x| x != root));
            candidates.push(normalize_ring(&ring));
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

/// Row-reduced set of edge bit vectors.
struct CycleBasis {
    words: usize,
    rows: Vec<Vec<u64>>,
}

impl CycleBasis {
    fn new(num_edges: usize) -> Self {
        Self {
            words: num_edges.div_ceil(64).max(1),
            rows: Vec::new(),
        }
    }

    /// Adds `bits` if it is independent of the rows so far.
    fn insert(&mut self, mut bits: Vec<u64>) -> bool {
        for row in &self.rows {
            if let Some(p) = leading_bit(row) {
                if bits[p / 64] & (1u64 << (p % 64)) != 0 {
                    for (a, b) in bits.iter_mut().zip(row) {
                        *a ^= b;
                    }
                }
            }
        }
        if bits.iter().all(|&w| w == 0) {
            return false;
        }
        self.rows.push(bits);
        true
    }
}

fn edge_bits(mol: &Mol, ring: &[NodeIndex], words: usize) -> Vec<u64> {
    let mut bits = vec![0u64; words];
    let len = ring.len();
    for i in 0..len {
        if let Some(edge) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
            let idx = edge.index();
            bits[idx / 64] |= 1u64 << (idx % 64);
        }
    }
    bits
}

fn leading_bit(bits: &[u64]) -> Option<usize> {
    bits.iter()
        .enumerate()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize)
}

/// Rotates a ring to start at its lowest atom and orients it so the
/// second atom is the smaller neighbour.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let Some(min_pos) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    let len = ring.len();
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn rings_of(smiles: &str) -> RingInfo {
        RingInfo::sssr(&parse_smiles(smiles).unwrap())
    }

    fn sizes(ri: &RingInfo) -> Vec<usize> {
        ri.rings().iter().map(Vec::len).collect()
    }

    #[test]
    fn acyclic() {
        let ri = rings_of("CCCC");
        assert_eq!(ri.num_rings(), 0);
        assert!(!ri.is_ring_atom(n(0)));
    }

    #[test]
    fn small_rings() {
        assert_eq!(sizes(&rings_of("C1CC1")), vec![3]);
        assert_eq!(sizes(&rings_of("C1CCC1")), vec![4]);
        assert_eq!(sizes(&rings_of("C1CCCC1")), vec![5]);
        assert_eq!(sizes(&rings_of("C1CCCCC1")), vec![6]);
    }

    #[test]
    fn naphthalene_two_six_rings() {
        let ri = rings_of("c1ccc2ccccc2c1");
        assert_eq!(sizes(&ri), vec![6, 6]);
        assert!(ri.is_ring_bond(n(3), n(8)));
    }

    #[test]
    fn norbornane() {
        let ri = rings_of("C1CC2CCC1C2");
        assert_eq!(sizes(&ri), vec![5, 5]);
    }

    #[test]
    fn spiro() {
        let ri = rings_of("C1CCC2(C1)CCCC2");
        assert_eq!(sizes(&ri), vec![5, 5]);
        assert_eq!(ri.smallest_ring_size(n(3)), Some(5));
    }

    #[test]
    fn cubane() {
        let mol = parse_smiles("C12C3C4C1C5C2C3C45").unwrap();
        assert_eq!(RingInfo::cyclomatic_number(&mol), 5);
        let ri = RingInfo::sssr(&mol);
        assert_eq!(sizes(&ri), vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn phenol_oxygen_not_in_ring() {
        let ri = rings_of("Oc1ccccc1");
        assert!(!ri.is_ring_atom(n(0)));
        assert!(ri.is_ring_atom(n(1)));
        assert_eq!(ri.smallest_ring_size(n(0)), None);
    }

    #[test]
    fn rings_are_cycles_of_bonds() {
        let mol = parse_smiles("C1CC2CCCC2C1").unwrap();
        let ri = RingInfo::sssr(&mol);
        for ring in ri.rings() {
            let len = ring.len();
            for i in 0..len {
                assert!(mol.bond_between(ring[i], ring[(i + 1) % len]).is_some());
            }
        }
    }

    #[test]
    fn disconnected_rings() {
        let ri = rings_of("C1CC1.C1CCC1");
        assert_eq!(sizes(&ri), vec![3, 4]);
    }
}
