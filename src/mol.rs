use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};

/// A molecular graph: heavy atoms as nodes, bonds as undirected edges.
///
/// Node indices are stable while atoms are only added. Removing a bond may
/// renumber the *edge* indices (petgraph swaps the last edge into the hole),
/// so callers that remove bonds should look bonds up by their endpoints.
#[derive(Debug, Clone, Default)]
pub struct Mol {
    graph: UnGraph<Atom, Bond>,
}

impl Mol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &UnGraph<Atom, Bond> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &Atom {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut Atom {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &Bond {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut Bond {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: Atom) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: Bond) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    /// Removes the bond between `a` and `b`, returning it if there was one.
    pub fn remove_bond(&mut self, a: NodeIndex, b: NodeIndex) -> Option<Bond> {
        let edge = self.graph.find_edge(a, b)?;
        self.graph.remove_edge(edge)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).count()
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn has_aromatic_bonds(&self) -> bool {
        self.graph
            .edge_weights()
            .any(|b| b.order == BondOrder::Aromatic)
    }

    /// Bond-order sum around `idx`, counting aromatic bonds as one.
    pub(crate) fn reader_bond_order_sum(&self, idx: NodeIndex) -> u8 {
        self.graph
            .edges(idx)
            .map(|e| e.weight().order.reader_contribution())
            .fold(0u8, u8::saturating_add)
    }
}
