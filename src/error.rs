//! Errors surfaced by the action enumerator and the molecule environment.
//!
//! Chemistry failures on individual edit candidates never reach these types;
//! the enumerator drops such candidates and moves on.

use thiserror::Error;

use crate::sanitize::SanitizeError;
use crate::smiles::SmilesError;

/// A state string the chemistry backend could not turn into a valid molecule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    #[error("invalid state {state:?}: {source}")]
    Syntax {
        state: String,
        #[source]
        source: SmilesError,
    },
    #[error("invalid state {state:?}: {source}")]
    Chemistry {
        state: String,
        #[source]
        source: SanitizeError,
    },
}

impl InvalidStateError {
    pub fn state(&self) -> &str {
        match self {
            Self::Syntax { state, .. } | Self::Chemistry { state, .. } => state,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown atom type {0:?}")]
    UnknownAtomType(String),
    #[error("at least one atom type is required")]
    NoAtomTypes,
    #[error("ring size {0} cannot close a ring")]
    InvalidRingSize(usize),
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`MoleculeEnv`](crate::env::MoleculeEnv).
#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    /// The action is not in the current action space. The episode is unchanged.
    #[error("invalid action {action:?}")]
    InvalidAction { action: String },
    /// The step budget is spent or the goal holds; call `initialize` again.
    #[error("episode terminated after {steps} steps")]
    EpisodeTerminated { steps: usize },
    #[error("episode not initialized")]
    NotInitialized,
    #[error(transparent)]
    Config(#[from] ConfigError),
}
