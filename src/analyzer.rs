//! This module provides the checks a machine definition must pass before it can be
//! simulated, plus a non-fatal reachability analysis.

use crate::types::{Definition, MachineError, State};
use std::collections::HashSet;

type Check = fn(&Definition) -> Result<(), MachineError>;

/// Validates a `Definition`, returning the first violation found.
///
/// The final-state check runs first, so a final state with outgoing transitions is
/// reported no matter what else is wrong with the definition.
///
/// # Returns
///
/// * `Ok(())` if the definition is internally consistent.
/// * `Err(MachineError::FinalState)` if a final state has transitions.
/// * `Err(MachineError::InvalidState)` if a referenced state is not declared.
/// * `Err(MachineError::InvalidSymbol)` if a referenced symbol is not declared, or the
///   alphabets are inconsistent.
/// * `Err(MachineError::InitialState)` if the initial state is also final.
pub fn analyze(definition: &Definition) -> Result<(), MachineError> {
    const CHECKS: [Check; 6] = [
        check_final_state_transitions,
        check_input_symbols,
        check_blank_symbol,
        check_transitions,
        check_initial_state,
        check_final_states,
    ];

    CHECKS.iter().try_for_each(|check| check(definition))
}

/// Checks that no final state appears as a source state of the transition relation.
fn check_final_state_transitions(definition: &Definition) -> Result<(), MachineError> {
    match definition
        .final_states
        .iter()
        .find(|state| definition.transitions.contains_key(*state))
    {
        Some(state) => Err(MachineError::FinalState(state.clone())),
        None => Ok(()),
    }
}

/// Checks that the input alphabet is a subset of the tape alphabet.
fn check_input_symbols(definition: &Definition) -> Result<(), MachineError> {
    match definition
        .input_symbols
        .difference(&definition.tape_symbols)
        .next()
    {
        Some(&symbol) => Err(MachineError::InvalidSymbol {
            symbol,
            reason: "input symbol is not a tape symbol".to_string(),
        }),
        None => Ok(()),
    }
}

/// Checks that the blank is a tape symbol but not an input symbol.
fn check_blank_symbol(definition: &Definition) -> Result<(), MachineError> {
    let blank = definition.blank;
    if !definition.tape_symbols.contains(&blank) {
        return Err(MachineError::InvalidSymbol {
            symbol: blank,
            reason: "blank symbol is not a tape symbol".to_string(),
        });
    }

    if definition.input_symbols.contains(&blank) {
        return Err(MachineError::InvalidSymbol {
            symbol: blank,
            reason: "blank symbol cannot be an input symbol".to_string(),
        });
    }

    Ok(())
}

/// Checks every source state, read symbol, target state and written symbol of the
/// transition relation against the declared sets.
fn check_transitions(definition: &Definition) -> Result<(), MachineError> {
    for (state, paths) in &definition.transitions {
        check_declared_state(definition, state, "transition state is not declared")?;

        for (&read, outcomes) in paths {
            check_declared_symbol(
                definition,
                read,
                &format!("transition symbol for state {state} is not declared"),
            )?;

            for outcome in outcomes {
                check_declared_state(
                    definition,
                    &outcome.next_state,
                    "result state is not declared",
                )?;
                check_declared_symbol(definition, outcome.write, "result symbol is not declared")?;
            }
        }
    }

    Ok(())
}

/// Checks that the initial state is declared and is not final.
fn check_initial_state(definition: &Definition) -> Result<(), MachineError> {
    check_declared_state(
        definition,
        &definition.initial_state,
        "initial state is not declared",
    )?;

    if definition.final_states.contains(&definition.initial_state) {
        return Err(MachineError::InitialState(definition.initial_state.clone()));
    }

    Ok(())
}

/// Checks that every final state is declared.
fn check_final_states(definition: &Definition) -> Result<(), MachineError> {
    definition
        .final_states
        .iter()
        .try_for_each(|state| check_declared_state(definition, state, "final state is not declared"))
}

fn check_declared_state(
    definition: &Definition,
    state: &State,
    reason: &str,
) -> Result<(), MachineError> {
    if definition.states.contains(state) {
        Ok(())
    } else {
        Err(MachineError::InvalidState {
            state: state.clone(),
            reason: reason.to_string(),
        })
    }
}

fn check_declared_symbol(
    definition: &Definition,
    symbol: char,
    reason: &str,
) -> Result<(), MachineError> {
    if definition.tape_symbols.contains(&symbol) {
        Ok(())
    } else {
        Err(MachineError::InvalidSymbol {
            symbol,
            reason: reason.to_string(),
        })
    }
}

/// Returns the declared states that no sequence of transitions can reach from the
/// initial state, sorted.
///
/// The traversal ignores symbols: a state counts as reachable if some transition leads
/// to it, whether or not the tape could ever present the symbol it reads.
pub fn unreachable_states(definition: &Definition) -> Vec<State> {
    let mut visited = HashSet::new();
    let mut queue = vec![definition.initial_state.clone()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }

        if let Some(paths) = definition.transitions.get(&state) {
            for outcome in paths.values().flatten() {
                if !visited.contains(&outcome.next_state) {
                    queue.push(outcome.next_state.clone());
                }
            }
        }
    }

    // `states` is ordered, so the result is too.
    definition
        .states
        .iter()
        .filter(|state| !visited.contains(*state))
        .cloned()
        .collect()
}
