pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod element;
pub mod enumerate;
pub mod env;
pub mod error;
pub mod graph_ops;
pub mod kekulize;
pub mod mol;
pub mod oracle;
pub mod rings;
pub mod sanitize;
pub mod smiles;
pub mod valence;

pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use element::Element;
pub use enumerate::{ActionConfig, ActionEnumerator};
pub use env::{EnvConfig, EpisodePhase, MoleculeEnv, StateRenderer, StepResult};
pub use error::{ConfigError, EnvError, InvalidStateError};
pub use kekulize::{kekulize, KekulizeError};
pub use mol::Mol;
pub use oracle::{ChemicalOracle, SmilesOracle};
pub use rings::RingInfo;
pub use sanitize::{sanitize, SanitizeError};
pub use smiles::{parse_smiles, to_canonical_smiles, SmilesError};
pub use valence::ValenceError;
