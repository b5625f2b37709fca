//! The molecule-editing MDP.
//!
//! An episode starts from an optional initial molecule and advances one
//! graph edit at a time. Each step must pick a member of the cached action
//! space; the episode ends when the step budget is spent or the goal
//! predicate holds, and stays ended until [`MoleculeEnv::initialize`] is
//! called again.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enumerate::{ActionConfig, ActionEnumerator};
use crate::error::{ConfigError, EnvError};
use crate::oracle::{ChemicalOracle, SmilesOracle};

/// Episode options. The action-space options sit at the same level in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    #[serde(flatten)]
    pub actions: ActionConfig,
    /// Starting molecule; `None` starts from the empty molecule.
    pub init_mol: Option<String>,
    pub max_steps: usize,
    pub record_path: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            actions: ActionConfig::default(),
            init_mol: None,
            max_steps: 10,
            record_path: false,
        }
    }
}

impl EnvConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub state: String,
    pub reward: f64,
    pub terminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodePhase {
    Uninitialized,
    Active,
    Terminated,
}

/// Draws a state for display. The environment hands it canonical strings;
/// the empty molecule is `""`.
pub trait StateRenderer {
    type Output;

    fn render(&self, state: &str) -> Self::Output;
}

type RewardFn = Box<dyn Fn(&str) -> f64 + Send + Sync>;
type GoalFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A single episode over molecular graphs.
///
/// Every mutating method takes `&mut self`; run independent episodes in
/// separate environments.
pub struct MoleculeEnv<O = SmilesOracle> {
    enumerator: ActionEnumerator<O>,
    init_mol: Option<String>,
    max_steps: usize,
    record_path: bool,
    reward: Option<RewardFn>,
    target: Option<GoalFn>,

    state: Option<String>,
    counter: usize,
    phase: EpisodePhase,
    valid_actions: Option<HashSet<String>>,
    path: Vec<String>,
}

impl MoleculeEnv<SmilesOracle> {
    pub fn new(config: EnvConfig) -> Result<Self, EnvError> {
        Self::with_oracle(SmilesOracle, config)
    }
}

impl<O: ChemicalOracle> MoleculeEnv<O> {
    pub fn with_oracle(oracle: O, config: EnvConfig) -> Result<Self, EnvError> {
        let enumerator = ActionEnumerator::new(oracle, config.actions)?;
        Ok(Self {
            enumerator,
            init_mol: config.init_mol,
            max_steps: config.max_steps,
            record_path: config.record_path,
            reward: None,
            target: None,
            state: None,
            counter: 0,
            phase: EpisodePhase::Uninitialized,
            valid_actions: None,
            path: Vec::new(),
        })
    }

    /// Reward for each state reached by a step. Without one, every step
    /// earns 0.0.
    pub fn with_reward(mut self, reward: impl Fn(&str) -> f64 + Send + Sync + 'static) -> Self {
        self.reward = Some(Box::new(reward));
        self
    }

    /// Goal predicate; the episode ends once it holds on the current state.
    pub fn with_target(mut self, target: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.target = Some(Box::new(target));
        self
    }

    /// Starts a new episode from the initial molecule.
    ///
    /// The initial molecule is parsed and stored in canonical form; one with
    /// no atoms starts the episode from the empty molecule. On error the
    /// previous episode is left as it was.
    pub fn initialize(&mut self) -> Result<(), EnvError> {
        let oracle = self.enumerator.oracle();
        let state = match self.init_mol.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(smiles) => {
                let mol = oracle.parse(smiles)?;
                (!mol.is_empty()).then(|| oracle.canonical_smiles(&mol))
            }
            None => None,
        };
        let actions = self.enumerator.enumerate(state.as_deref())?;

        self.path.clear();
        if self.record_path {
            self.path.push(state.clone().unwrap_or_default());
        }
        self.state = state;
        self.counter = 0;
        self.valid_actions = Some(actions);
        self.phase = if self.episode_over() {
            EpisodePhase::Terminated
        } else {
            EpisodePhase::Active
        };

        debug!(
            state = self.state.as_deref().unwrap_or(""),
            actions = self.valid_actions.as_ref().map_or(0, HashSet::len),
            max_steps = self.max_steps,
            "episode initialized"
        );
        Ok(())
    }

    /// Moves to `action`, which must be in the current action space.
    ///
    /// A rejected action leaves the episode untouched.
    ///
    /// # Errors
    ///
    /// - [`EnvError::NotInitialized`] before the first [`initialize`](Self::initialize).
    /// - [`EnvError::EpisodeTerminated`] once the step budget is spent or the
    ///   goal holds.
    /// - [`EnvError::InvalidAction`] when `action` is not in the action space.
    pub fn step(&mut self, action: &str) -> Result<StepResult, EnvError> {
        if self.phase == EpisodePhase::Uninitialized {
            return Err(EnvError::NotInitialized);
        }
        if self.episode_over() {
            self.phase = EpisodePhase::Terminated;
            return Err(EnvError::EpisodeTerminated {
                steps: self.counter,
            });
        }
        if !self.cached_actions()?.contains(action) {
            return Err(EnvError::InvalidAction {
                action: action.to_string(),
            });
        }

        let next_actions = self.enumerator.enumerate(Some(action))?;
        self.state = Some(action.to_string());
        if self.record_path {
            self.path.push(action.to_string());
        }
        self.valid_actions = Some(next_actions);
        self.counter += 1;

        let terminated = self.episode_over();
        if terminated {
            self.phase = EpisodePhase::Terminated;
        }
        let reward = self.reward.as_ref().map_or(0.0, |f| f(action));

        debug!(step = self.counter, state = action, reward, terminated, "step");
        Ok(StepResult {
            state: action.to_string(),
            reward,
            terminated,
        })
    }

    /// The legal actions from the current state. The caller gets its own
    /// copy; mutating it does not affect the episode.
    pub fn valid_actions(&mut self) -> Result<HashSet<String>, EnvError> {
        if self.phase == EpisodePhase::Uninitialized {
            return Err(EnvError::NotInitialized);
        }
        self.cached_actions().cloned()
    }

    /// Recomputes the action space of the current state.
    pub fn rebuild_valid_actions(&mut self) -> Result<HashSet<String>, EnvError> {
        if self.phase == EpisodePhase::Uninitialized {
            return Err(EnvError::NotInitialized);
        }
        self.valid_actions = None;
        self.cached_actions().cloned()
    }

    /// The action space of any state. The episode's cache is not touched.
    pub fn valid_actions_for(&self, state: Option<&str>) -> Result<HashSet<String>, EnvError> {
        Ok(self.enumerator.enumerate(state)?)
    }

    /// Renders `state`, or the current state when `None`, in canonical form.
    pub fn visualize_state<R: StateRenderer>(
        &self,
        renderer: &R,
        state: Option<&str>,
    ) -> Result<R::Output, EnvError> {
        let oracle = self.enumerator.oracle();
        let key = match state.or(self.state.as_deref()).filter(|s| !s.trim().is_empty()) {
            Some(smiles) => oracle.canonical_smiles(&oracle.parse(smiles)?),
            None => String::new(),
        };
        Ok(renderer.render(&key))
    }

    /// Current state; `None` is the empty molecule.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn num_steps_taken(&self) -> usize {
        self.counter
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// States visited this episode, initial state first. Empty unless path
    /// recording is on; the empty molecule is recorded as `""`.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn enumerator(&self) -> &ActionEnumerator<O> {
        &self.enumerator
    }

    fn goal_reached(&self) -> bool {
        match (&self.target, self.state.as_deref()) {
            (Some(target), Some(state)) => target(state),
            _ => false,
        }
    }

    fn episode_over(&self) -> bool {
        self.counter >= self.max_steps || self.goal_reached()
    }

    fn cached_actions(&mut self) -> Result<&HashSet<String>, EnvError> {
        let actions = match self.valid_actions.take() {
            Some(actions) => actions,
            None => self.enumerator.enumerate(self.state.as_deref())?,
        };
        let actions: &HashSet<String> = self.valid_actions.insert(actions);
        Ok(actions)
    }
}

impl<O: fmt::Debug> fmt::Debug for MoleculeEnv<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoleculeEnv")
            .field("enumerator", &self.enumerator)
            .field("init_mol", &self.init_mol)
            .field("max_steps", &self.max_steps)
            .field("state", &self.state)
            .field("counter", &self.counter)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
