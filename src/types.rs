//! This module defines the core data structures and types shared by the nondeterministic
//! Turing machine simulator: machine definitions, transition outcomes, directions,
//! simulation settings and error types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The blank symbol used when a definition does not declare one.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The maximum allowed size for a machine definition in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The number of steps a simulation may take when the caller does not supply a bound.
pub const DEFAULT_STEP_BOUND: usize = 99_999;
/// Frontier size from which successor expansion is spread across the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 64;

/// A machine state. Compared by value.
pub type State = String;
/// A tape symbol. Compared by value.
pub type Symbol = char;

/// The transition relation: for each state, the outcomes available for every symbol it can read.
///
/// Nondeterminism lives in the innermost set: one `(state, symbol)` pair maps to every
/// outcome the machine may choose from.
pub type Transitions = HashMap<State, HashMap<Symbol, BTreeSet<Transition>>>;

/// The unvalidated description of a nondeterministic Turing machine.
///
/// This is what loaders produce and what [`crate::Machine::new`] validates. It carries the
/// six attributes of the machine plus a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Definition {
    /// A human-readable name for the machine.
    #[serde(default)]
    pub name: String,
    /// Every state the machine may be in.
    pub states: BTreeSet<State>,
    /// The alphabet input strings are drawn from.
    pub input_symbols: BTreeSet<Symbol>,
    /// Every symbol that may appear on the tape, including the blank.
    pub tape_symbols: BTreeSet<Symbol>,
    /// The transition relation.
    pub transitions: Transitions,
    /// The state the machine starts in.
    pub initial_state: State,
    /// The symbol filling every cell that was never written.
    #[serde(default = "default_blank")]
    pub blank: Symbol,
    /// Accepting states. These must not have outgoing transitions.
    #[serde(default)]
    pub final_states: BTreeSet<State>,
}

fn default_blank() -> Symbol {
    DEFAULT_BLANK_SYMBOL
}

impl Definition {
    /// Returns the number of `(state, symbol) -> outcome` triples in the relation.
    pub fn transition_count(&self) -> usize {
        self.transitions
            .values()
            .flat_map(|paths| paths.values())
            .map(|outcomes| outcomes.len())
            .sum()
    }
}

/// One possible outcome of reading a symbol in a given state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: State,
    /// The symbol written over the cell under the head.
    pub write: Symbol,
    /// Where the head moves after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(next_state: impl Into<State>, write: Symbol, direction: Direction) -> Self {
        Self {
            next_state: next_state.into(),
            write,
            direction,
        }
    }
}

/// Represents the possible directions a Turing Machine head can move.
///
/// Decoding goes through [`FromStr`], so JSON definitions accept the same spellings as the
/// text notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl FromStr for Direction {
    type Err = MachineError;

    /// Supports '<', 'L' or "Left" for Left, '>', 'R' or "Right" for Right, and '-', 'S',
    /// 'N' or "Stay" for Stay.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "<" | "L" | "Left" => Ok(Direction::Left),
            ">" | "R" | "Right" => Ok(Direction::Right),
            "-" | "S" | "N" | "Stay" => Ok(Direction::Stay),
            other => Err(MachineError::InvalidDirection(format!(
                "{other} (expected L, R or S)"
            ))),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = MachineError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

/// Settings for a single simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum number of steps; at most `step_bound + 1` frontiers are produced.
    pub step_bound: usize,
    /// Whether successor expansion may run on the rayon thread pool.
    pub parallel: bool,
    /// Minimum frontier size before expansion goes parallel.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_bound: DEFAULT_STEP_BOUND,
            parallel: true,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

impl SimulationConfig {
    /// Returns a copy of this configuration with a different step bound.
    pub fn with_step_bound(self, step_bound: usize) -> Self {
        Self { step_bound, ..self }
    }

    /// Returns a copy of this configuration that never expands in parallel.
    pub fn sequential(self) -> Self {
        Self {
            parallel: false,
            ..self
        }
    }
}

/// Represents various errors that can occur while defining, loading or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// A referenced state is not one of the declared states.
    #[error("Invalid state {state}: {reason}")]
    InvalidState { state: State, reason: String },
    /// A referenced symbol is not one of the declared symbols.
    #[error("Invalid symbol {symbol:?}: {reason}")]
    InvalidSymbol { symbol: Symbol, reason: String },
    /// A transition names a head movement other than left, right or stay.
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),
    /// The initial state fails a required condition.
    #[error("Initial state {0} is also a final state")]
    InitialState(State),
    /// A final state has outgoing transitions.
    #[error("Final state {0} has transitions defined")]
    FinalState(State),
    /// The input was rejected. Only produced on request, see [`crate::Run::into_result`].
    #[error("Input {input:?} was rejected")]
    Rejected { input: String },
    /// Indicates an error during the parsing of a machine definition.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A serialized definition could not be decoded.
    #[error("Definition decoding error: {0}")]
    DefinitionError(String),
    /// Indicates a structurally incomplete definition (missing or repeated sections).
    #[error("Definition validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

impl From<serde_json::Error> for MachineError {
    fn from(error: serde_json::Error) -> Self {
        MachineError::DefinitionError(error.to_string())
    }
}
