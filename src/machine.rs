//! This module defines the `Machine` struct, the validated and immutable description of a
//! nondeterministic Turing machine, along with the single-branch step relation the
//! exploration engine is built on.

use crate::analyzer::{analyze, unreachable_states};
use crate::configuration::Configuration;
use crate::tape::Tape;
use crate::types::{Definition, MachineError, State, Symbol, Transition};
use log::{trace, warn};
use std::collections::BTreeSet;

/// A validated nondeterministic Turing machine.
///
/// A `Machine` can only be obtained through [`Machine::new`], which rejects malformed
/// definitions, and it exposes no way to mutate the definition afterwards. It can be
/// shared by reference across any number of concurrent simulations.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    definition: Definition,
}

impl Machine {
    /// Validates a `Definition` and wraps it into a `Machine`.
    ///
    /// States that can never be reached from the initial state are logged as warnings but
    /// do not fail construction.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if every invariant holds.
    /// * `Err(MachineError)` describing the first violation otherwise.
    pub fn new(definition: Definition) -> Result<Self, MachineError> {
        analyze(&definition)?;

        let unreachable = unreachable_states(&definition);
        if !unreachable.is_empty() {
            warn!(
                "Machine '{}' declares unreachable states: {:?}",
                definition.name, unreachable
            );
        }

        Ok(Self { definition })
    }

    /// Builds a machine without running any checks.
    #[cfg(test)]
    pub(crate) fn new_unchecked(definition: Definition) -> Self {
        Self { definition }
    }

    /// Returns the machine's display name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Returns the declared states.
    pub fn states(&self) -> &BTreeSet<State> {
        &self.definition.states
    }

    /// Returns the input alphabet.
    pub fn input_symbols(&self) -> &BTreeSet<Symbol> {
        &self.definition.input_symbols
    }

    /// Returns the tape alphabet.
    pub fn tape_symbols(&self) -> &BTreeSet<Symbol> {
        &self.definition.tape_symbols
    }

    /// Returns the initial state.
    pub fn initial_state(&self) -> &str {
        &self.definition.initial_state
    }

    /// Returns the blank symbol.
    pub fn blank(&self) -> Symbol {
        self.definition.blank
    }

    /// Returns the accepting states.
    pub fn final_states(&self) -> &BTreeSet<State> {
        &self.definition.final_states
    }

    /// Returns the definition this machine was validated from.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Checks whether `state` is accepting.
    pub fn is_final(&self, state: &str) -> bool {
        self.definition.final_states.contains(state)
    }

    /// Returns every outcome available when reading `symbol` in `state`.
    ///
    /// An absent entry yields nothing: the branch dies.
    pub fn transitions(&self, state: &str, symbol: Symbol) -> impl Iterator<Item = &Transition> {
        self.definition
            .transitions
            .get(state)
            .and_then(|paths| paths.get(&symbol))
            .into_iter()
            .flatten()
    }

    /// Checks that every symbol of `input` belongs to the input alphabet.
    ///
    /// Simulation itself never checks its input; this is for callers that want to refuse
    /// foreign symbols up front.
    pub fn validate_input(&self, input: &str) -> Result<(), MachineError> {
        match input
            .chars()
            .find(|symbol| !self.definition.input_symbols.contains(symbol))
        {
            Some(symbol) => Err(MachineError::InvalidSymbol {
                symbol,
                reason: "input contains a symbol outside the input alphabet".to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns the configuration a simulation of `input` starts from.
    pub fn initial_configuration(&self, input: &str) -> Configuration {
        Configuration::new(
            self.definition.initial_state.clone(),
            Tape::new(input, self.definition.blank),
        )
    }

    /// Returns every configuration reachable from `configuration` in exactly one step.
    ///
    /// The result may contain duplicates only if the relation holds two outcomes that
    /// produce the same configuration, which the set-valued relation rules out.
    pub fn successors(&self, configuration: &Configuration) -> Vec<Configuration> {
        let tape = configuration.tape();
        let symbol = tape.read();

        let next: Vec<Configuration> = self
            .transitions(configuration.state(), symbol)
            .map(|outcome| {
                Configuration::new(
                    outcome.next_state.clone(),
                    tape.write(outcome.write).move_head(outcome.direction),
                )
            })
            .collect();

        if next.is_empty() {
            trace!(
                "Branch in state {} reading {:?} has no transition",
                configuration.state(),
                symbol
            );
        }

        next
    }
}

impl TryFrom<Definition> for Machine {
    type Error = MachineError;

    fn try_from(definition: Definition) -> Result<Self, Self::Error> {
        Machine::new(definition)
    }
}
