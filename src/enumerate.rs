//! Action-space enumeration: every molecule one graph edit away from a state.
//!
//! Four edit families are generated from a kekulized working copy of the
//! state: atom addition, bond addition (or order increase), bond removal (or
//! order decrease) and the no-op. Each candidate is sanitized by the oracle;
//! failures are dropped and survivors are collected as canonical SMILES, so
//! the action space is a deduplicated set.

use std::collections::{BTreeSet, HashSet};

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::error::{ConfigError, InvalidStateError};
use crate::graph_ops;
use crate::mol::Mol;
use crate::oracle::{ChemicalOracle, SmilesOracle};
use crate::sanitize::SanitizeError;

/// Options that shape the action space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Element symbols an agent may add, e.g. `["C", "N", "O"]`.
    pub atom_types: Vec<String>,
    pub allow_removal: bool,
    pub allow_no_modification: bool,
    /// When set, a new bond may only close a ring of one of these sizes.
    pub allowed_ring_sizes: Option<BTreeSet<usize>>,
    pub allow_bonds_between_rings: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            atom_types: vec!["C".into(), "N".into(), "O".into()],
            allow_removal: true,
            allow_no_modification: true,
            allowed_ring_sizes: None,
            allow_bonds_between_rings: true,
        }
    }
}

impl ActionConfig {
    pub fn new<I, S>(atom_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            atom_types: atom_types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct AtomType {
    label: String,
    element: Element,
    max_valence: u8,
}

/// Implicit-hydrogen levels: for each level `v` in `1..max_level`, the atoms
/// with at least `v` free valence.
struct FreeValenceMap {
    levels: Vec<Vec<NodeIndex>>,
}

impl FreeValenceMap {
    fn build<O: ChemicalOracle>(oracle: &O, mol: &Mol, max_level: u8) -> Self {
        let levels = (1..max_level)
            .map(|v| {
                mol.atoms()
                    .filter(|&a| oracle.free_valence(mol, a) >= v)
                    .collect()
            })
            .collect();
        Self { levels }
    }

    fn atoms_at(&self, level: u8) -> &[NodeIndex] {
        match usize::from(level).checked_sub(1).and_then(|i| self.levels.get(i)) {
            Some(atoms) => atoms,
            None => &[],
        }
    }

    fn levels(&self) -> impl Iterator<Item = (u8, &[NodeIndex])> + '_ {
        (1u8..).zip(self.levels.iter().map(Vec::as_slice))
    }
}

/// Enumerates the legal successors of a molecule.
///
/// Enumeration only reads `self`, so one enumerator can serve many states
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct ActionEnumerator<O = SmilesOracle> {
    oracle: O,
    config: ActionConfig,
    atom_types: Vec<AtomType>,
    max_level: u8,
}

impl ActionEnumerator<SmilesOracle> {
    pub fn with_config(config: ActionConfig) -> Result<Self, ConfigError> {
        Self::new(SmilesOracle, config)
    }
}

impl<O: ChemicalOracle> ActionEnumerator<O> {
    pub fn new(oracle: O, config: ActionConfig) -> Result<Self, ConfigError> {
        let mut atom_types: Vec<AtomType> = Vec::new();
        for label in &config.atom_types {
            if atom_types.iter().any(|t| &t.label == label) {
                continue;
            }
            let (Some(element), Some(max_valence)) =
                (Element::from_symbol(label), oracle.max_valence(label))
            else {
                return Err(ConfigError::UnknownAtomType(label.clone()));
            };
            atom_types.push(AtomType {
                label: label.clone(),
                element,
                max_valence,
            });
        }
        if atom_types.is_empty() {
            return Err(ConfigError::NoAtomTypes);
        }
        if let Some(&size) = config
            .allowed_ring_sizes
            .iter()
            .flatten()
            .find(|&&size| size < 3)
        {
            return Err(ConfigError::InvalidRingSize(size));
        }

        let max_level = atom_types.iter().map(|t| t.max_valence).max().unwrap_or(1);
        Ok(Self {
            oracle,
            config,
            atom_types,
            max_level,
        })
    }

    pub fn config(&self) -> &ActionConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    fn atom_labels(&self) -> HashSet<String> {
        self.atom_types.iter().map(|t| t.label.clone()).collect()
    }

    /// The set of canonical states one edit away from `state`.
    ///
    /// An absent, blank or atomless state (such as `"."`) yields exactly the
    /// atom-type labels. A state the oracle cannot parse is an error;
    /// candidates that fail sanitization are left out.
    pub fn enumerate(&self, state: Option<&str>) -> Result<HashSet<String>, InvalidStateError> {
        let Some(state) = state.filter(|s| !s.trim().is_empty()) else {
            return Ok(self.atom_labels());
        };

        let mol = self.oracle.parse(state)?;
        if mol.is_empty() {
            return Ok(self.atom_labels());
        }
        let kekule = self
            .oracle
            .kekulize(&mol)
            .map_err(|e| InvalidStateError::Chemistry {
                state: state.to_string(),
                source: SanitizeError::from(e),
            })?;
        let free = FreeValenceMap::build(&self.oracle, &mol, self.max_level);

        let mut actions = HashSet::new();
        let atom_additions = self.atom_additions(&kekule, &free, &mut actions);
        let bond_additions = self.bond_additions(&mol, &kekule, &free, &mut actions);
        let bond_removals = if self.config.allow_removal {
            self.bond_removals(&kekule, &mut actions)
        } else {
            0
        };
        if self.config.allow_no_modification {
            actions.insert(self.oracle.canonical_smiles(&mol));
        }

        debug!(
            state,
            atom_additions,
            bond_additions,
            bond_removals,
            total = actions.len(),
            "enumerated actions"
        );
        Ok(actions)
    }

    /// Sanitizes a candidate, returning its canonical form if it is valid.
    fn accept(&self, candidate: Mol) -> Option<Mol> {
        match self.oracle.sanitize(candidate) {
            Ok(mol) => Some(mol),
            Err(error) => {
                trace!(%error, "rejected candidate");
                None
            }
        }
    }

    fn atom_additions(&self, kekule: &Mol, free: &FreeValenceMap, out: &mut HashSet<String>) -> usize {
        let mut count = 0;
        for level in 1..=3u8 {
            let Some(order) = BondOrder::from_valence(level) else {
                continue;
            };
            for &atom in free.atoms_at(level) {
                for t in self.atom_types.iter().filter(|t| t.max_valence >= level) {
                    let mut candidate = kekule.clone();
                    let added = candidate.add_atom(Atom::new(t.element));
                    candidate.add_bond(atom, added, Bond::new(order));
                    if let Some(mol) = self.accept(candidate) {
                        out.insert(self.oracle.canonical_smiles(&mol));
                        count += 1;
                    }
                }
            }
        }
        count
    }

    fn bond_additions(
        &self,
        mol: &Mol,
        kekule: &Mol,
        free: &FreeValenceMap,
        out: &mut HashSet<String>,
    ) -> usize {
        let mut count = 0;
        for (level, atoms) in free.levels() {
            for (i, &a) in atoms.iter().enumerate() {
                for &b in &atoms[i + 1..] {
                    let Some(candidate) = self.bond_addition(mol, kekule, level, a, b) else {
                        continue;
                    };
                    if let Some(mol) = self.accept(candidate) {
                        out.insert(self.oracle.canonical_smiles(&mol));
                        count += 1;
                    }
                }
            }
        }
        count
    }

    /// Raises the a-b bond by `level`, or adds a new bond of that order.
    /// `None` when the edit is ruled out before sanitization.
    fn bond_addition(&self, mol: &Mol, kekule: &Mol, level: u8, a: NodeIndex, b: NodeIndex) -> Option<Mol> {
        if let Some(edge) = kekule.bond_between(a, b) {
            let raised = kekule.bond(edge).order.valence()? + level;
            let order = BondOrder::from_valence(raised)?;
            let mut candidate = kekule.clone();
            candidate.bond_mut(edge).order = order;
            return Some(candidate);
        }

        if !self.config.allow_bonds_between_rings
            && self.oracle.is_in_ring(mol, a)
            && self.oracle.is_in_ring(mol, b)
        {
            return None;
        }
        if let Some(sizes) = &self.config.allowed_ring_sizes {
            if !sizes.contains(&self.oracle.shortest_path_len(mol, a, b)) {
                return None;
            }
        }
        let mut candidate = kekule.clone();
        candidate.add_bond(a, b, Bond::new(BondOrder::from_valence(level)?));
        Some(candidate)
    }

    fn bond_removals(&self, kekule: &Mol, out: &mut HashSet<String>) -> usize {
        let mut count = 0;
        for amount in 1..=3u8 {
            for edge in kekule.bonds() {
                let Some(current) = kekule.bond(edge).order.valence() else {
                    continue;
                };
                let Some((a, b)) = kekule.bond_endpoints(edge) else {
                    continue;
                };
                let mut candidate = kekule.clone();
                let action = if current > amount {
                    let Some(order) = BondOrder::from_valence(current - amount) else {
                        continue;
                    };
                    candidate.bond_mut(edge).order = order;
                    self.accept(candidate)
                        .map(|mol| self.oracle.canonical_smiles(&mol))
                } else if current == amount {
                    candidate.remove_bond(a, b);
                    self.accept(candidate).and_then(|mol| self.prune_fragments(&mol))
                } else {
                    continue;
                };
                if let Some(smiles) = action {
                    out.insert(smiles);
                    count += 1;
                }
            }
        }
        count
    }

    /// After a bond is removed, keeps the largest fragment if every other
    /// piece is a lone atom; a split into two real molecules is discarded.
    fn prune_fragments(&self, mol: &Mol) -> Option<String> {
        let mut parts: Vec<(String, usize)> = graph_ops::fragments(mol)
            .iter()
            .map(|frag| (self.oracle.canonical_smiles(frag), frag.atom_count()))
            .collect();
        parts.sort_by(|(sa, na), (sb, nb)| {
            sa.len().cmp(&sb.len()).then(na.cmp(nb)).then_with(|| sa.cmp(sb))
        });
        let smallest_is_atom = parts.first().is_some_and(|(_, atoms)| *atoms == 1);
        if parts.len() == 1 || smallest_is_atom {
            parts.pop().map(|(smiles, _)| smiles)
        } else {
            trace!(fragments = parts.len(), "split into two molecules");
            None
        }
    }
}
