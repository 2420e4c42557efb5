//! This crate provides the core logic for a nondeterministic Turing machine simulator.
//! It includes modules for parsing machine definitions, validating them, exploring every
//! computation branch breadth-first, and managing a collection of predefined machines.

pub mod analyzer;
pub mod configuration;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod simulator;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the validation entry points from the analyzer module.
pub use analyzer::{analyze, unreachable_states};
/// Re-exports the `Configuration` struct from the configuration module.
pub use configuration::Configuration;
/// Re-exports the `DefinitionLoader` struct and `Format` enum from the loader module.
pub use loader::{DefinitionLoader, Format};
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the parsing functions from the parser module.
pub use parser::{parse, parse_definition};
/// Re-exports `MachineCatalog`, `MachineInfo`, and `MACHINES` from the programs module.
pub use programs::{MachineCatalog, MachineInfo, MACHINES};
/// Re-exports the exploration engine.
pub use simulator::{read_input, read_input_with, simulate, Frontier, Run, Simulation, Verdict};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the machine definition types and constants from the types module.
pub use types::{
    Definition, Direction, MachineError, SimulationConfig, State, Symbol, Transition,
    Transitions, DEFAULT_BLANK_SYMBOL, DEFAULT_STEP_BOUND, MAX_PROGRAM_SIZE, PARALLEL_THRESHOLD,
};
