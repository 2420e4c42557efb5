//! This module provides the parser for the `.ntm` text notation, utilizing the `pest` crate.
//! It turns a textual machine description into a [`Definition`], inferring the state set and
//! tape alphabet when they are not spelled out.

use crate::{
    machine::Machine,
    types::{
        Definition, Direction, MachineError, State, Symbol, Transition, Transitions,
        DEFAULT_BLANK_SYMBOL,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Derives a `PestParser` for the machine notation defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// Parses the given input string into a validated `Machine`.
///
/// This is the main entry point for text definitions. The parsed definition goes through
/// [`Machine::new`], so every validation error surfaces here as well.
///
/// # Returns
///
/// * `Ok(Machine)` if the input is successfully parsed and validated.
/// * `Err(MachineError::ParseError)` if there are any syntax errors.
/// * `Err(MachineError::InvalidDirection)` if a rule names an unknown head movement.
/// * `Err(MachineError::ValidationError)` if a required section is missing.
/// * Any validation error of [`Machine::new`].
pub fn parse(input: &str) -> Result<Machine, MachineError> {
    Machine::new(parse_definition(input)?)
}

/// Parses the given input string into an unvalidated `Definition`.
pub fn parse_definition(input: &str) -> Result<Definition, MachineError> {
    let root = DefinitionParser::parse(Rule::program, input.trim())
        .map_err(|e| MachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| MachineError::ValidationError("Empty definition".to_string()))?;

    parse_program(root)
}

/// Rules collected from the `rules:` section.
struct ParsedRules {
    transitions: Transitions,
    /// Every state that opens a block, in source order.
    blocks: Vec<State>,
}

/// Parses the top-level structure of a definition from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Definition, MachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<Symbol> = None;
    let mut input: Option<BTreeSet<Symbol>> = None;
    let mut symbols: Option<BTreeSet<Symbol>> = None;
    let mut states: Option<BTreeSet<State>> = None;
    let mut initial: Option<State> = None;
    let mut finals: Option<BTreeSet<State>> = None;
    let mut rules: Option<ParsedRules> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(inner(p)?.as_str().trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(inner(p)?.as_str())),
            Rule::input => input = Some(parse_symbol_list(inner(p)?)),
            Rule::symbols => symbols = Some(parse_symbol_list(inner(p)?)),
            Rule::states => states = Some(parse_state_list(inner(p)?)),
            Rule::initial => initial = Some(inner(p)?.as_str().to_string()),
            Rule::final_states => finals = Some(parse_state_list(inner(p)?)),
            Rule::rules => rules = Some(parse_rules(p)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let input_symbols = check_required_rule(input, "input")?;
    let ParsedRules {
        transitions,
        blocks,
    } = check_required_rule(rules, "rules")?;
    let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);
    let final_states = finals.unwrap_or_default();

    // The first rule block names the initial state unless `initial:` says otherwise.
    let initial_state = initial
        .or_else(|| blocks.first().cloned())
        .ok_or_else(|| MachineError::ValidationError("Missing 'initial' section".to_string()))?;

    let states = states
        .unwrap_or_else(|| infer_states(&transitions, &blocks, &initial_state, &final_states));
    let tape_symbols =
        symbols.unwrap_or_else(|| infer_symbols(&transitions, &input_symbols, blank));

    Ok(Definition {
        name,
        states,
        input_symbols,
        tape_symbols,
        transitions,
        initial_state,
        blank,
        final_states,
    })
}

/// Parses the `rules:` section.
///
/// Lines reading the same symbol in the same block merge into one outcome set. A block
/// without actions declares its state but adds no entry to the relation.
fn parse_rules(pair: Pair<Rule>) -> Result<ParsedRules, MachineError> {
    let mut transitions: Transitions = HashMap::new();
    let mut blocks: Vec<State> = Vec::new();

    // Rule: rules > [block] > state, [action]
    for block in pair.into_inner() {
        let span = block.as_span();
        let mut pairs = block.into_inner();
        let state = next_str(&mut pairs, span)?;

        if blocks.contains(&state) {
            return Err(parse_error(&format!("Duplicate rule block: {state}"), span));
        }
        blocks.push(state.clone());

        for action in pairs {
            let span = action.as_span();
            let mut parts = action.into_inner();
            let read = parse_symbol(&next_str(&mut parts, span)?);

            for outcome in parts {
                let transition = parse_outcome(outcome)?;
                transitions
                    .entry(state.clone())
                    .or_default()
                    .entry(read)
                    .or_default()
                    .insert(transition);
            }
        }
    }

    Ok(ParsedRules {
        transitions,
        blocks,
    })
}

/// Parses `write, direction, next_state` from a `Pair<Rule::outcome>`.
fn parse_outcome(pair: Pair<Rule>) -> Result<Transition, MachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let write = parse_symbol(&next_str(&mut pairs, span)?);
    let direction: Direction = next_str(&mut pairs, span)?.parse()?;
    let next_state = next_str(&mut pairs, span)?;

    Ok(Transition {
        next_state,
        write,
        direction,
    })
}

/// Parses a single character symbol from a string, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> Symbol {
    input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input)
        .chars()
        .next()
        .unwrap_or(DEFAULT_BLANK_SYMBOL)
}

/// Parses `[a, b, c]` into a set of symbols.
fn parse_symbol_list(pair: Pair<Rule>) -> BTreeSet<Symbol> {
    pair.into_inner().map(|p| parse_symbol(p.as_str())).collect()
}

/// Parses `[q0, q1]` into a set of states.
fn parse_state_list(pair: Pair<Rule>) -> BTreeSet<State> {
    pair.into_inner().map(|p| p.as_str().to_string()).collect()
}

/// Every state mentioned anywhere in the definition.
fn infer_states(
    transitions: &Transitions,
    blocks: &[State],
    initial_state: &State,
    final_states: &BTreeSet<State>,
) -> BTreeSet<State> {
    let targets = transitions
        .values()
        .flat_map(|paths| paths.values().flatten())
        .map(|outcome| outcome.next_state.clone());

    blocks
        .iter()
        .cloned()
        .chain(targets)
        .chain(std::iter::once(initial_state.clone()))
        .chain(final_states.iter().cloned())
        .collect()
}

/// The input alphabet, the blank, and every symbol read or written by a rule.
fn infer_symbols(
    transitions: &Transitions,
    input_symbols: &BTreeSet<Symbol>,
    blank: Symbol,
) -> BTreeSet<Symbol> {
    let mut symbols = input_symbols.clone();
    symbols.insert(blank);

    for (&read, outcomes) in transitions.values().flatten() {
        symbols.insert(read);
        symbols.extend(outcomes.iter().map(|outcome| outcome.write));
    }

    symbols
}

/// Returns the single inner pair of a section.
fn inner(pair: Pair<Rule>) -> Result<Pair<Rule>, MachineError> {
    let span = pair.as_span();
    pair.into_inner()
        .next()
        .ok_or_else(|| parse_error("Expected a value", span))
}

/// Extracts the string content of the next `Pair` in a `Pairs` iterator.
fn next_str(pairs: &mut Pairs<Rule>, span: Span) -> Result<String, MachineError> {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| parse_error("Incomplete rule", span))
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), MachineError> {
    if rule == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}:\" declaration", section_name(rule)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, MachineError> {
    value.ok_or_else(|| MachineError::ValidationError(format!("Missing '{name}' section")))
}

/// The keyword a section is introduced by.
fn section_name(rule: Rule) -> String {
    match rule {
        Rule::final_states => "final".to_string(),
        other => format!("{other:?}"),
    }
}
