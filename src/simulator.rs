//! This module implements the exploration engine: a level-synchronous breadth-first search
//! over sets of configurations.
//!
//! Every branch of the nondeterministic computation advances one step per level. The set of
//! live branches at a level is a [`Frontier`]; identical branches reached along different
//! paths collapse into one entry, which keeps re-converging computations from blowing up.
//! Frontiers are produced lazily by [`Simulation`], so a caller that has seen enough never
//! pays for the levels it does not pull.

use crate::configuration::Configuration;
use crate::machine::Machine;
use crate::types::{MachineError, SimulationConfig};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Every live branch at a given step.
///
/// Configurations are shared, so handing a frontier to the caller while keeping it for the
/// next expansion copies pointers, not tapes.
pub type Frontier = HashSet<Arc<Configuration>>;

/// How a simulation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A branch reached a final state. Holds one witnessing configuration; which one is
    /// picked when several branches accept at the same level is unspecified.
    Accepted(Configuration),
    /// Every branch died.
    Rejected,
    /// The step bound ran out before any branch accepted or all branches died.
    Undecided,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// A lazy, finite sequence of frontiers for one machine and one input.
///
/// The first item is the initial frontier. Iteration stops after the first frontier that
/// holds an accepting configuration, after an empty frontier, or after `step_bound` steps,
/// whichever comes first. The verdict is available from [`Simulation::verdict`] once the
/// last frontier has been yielded.
///
/// Each call to [`simulate`] starts from scratch; nothing carries over between simulations.
pub struct Simulation<'a> {
    machine: &'a Machine,
    config: SimulationConfig,
    initial: Option<Configuration>,
    current: Option<Frontier>,
    steps: usize,
    verdict: Option<Verdict>,
}

impl<'a> Simulation<'a> {
    /// Prepares a simulation of `input` with default settings.
    pub fn new(machine: &'a Machine, input: &str) -> Self {
        Self::with_config(machine, input, SimulationConfig::default())
    }

    /// Prepares a simulation of `input` with explicit settings.
    pub fn with_config(machine: &'a Machine, input: &str, config: SimulationConfig) -> Self {
        Self {
            machine,
            config,
            initial: Some(machine.initial_configuration(input)),
            current: None,
            steps: 0,
            verdict: None,
        }
    }

    /// Returns the verdict, or `None` while frontiers remain to be produced.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Returns the number of steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Computes the frontier that follows `frontier`.
    fn expand(&self, frontier: &Frontier) -> Frontier {
        let machine = self.machine;
        if self.config.parallel && frontier.len() >= self.config.parallel_threshold {
            frontier
                .par_iter()
                .flat_map_iter(|config| machine.successors(config).into_iter().map(Arc::new))
                .collect()
        } else {
            frontier
                .iter()
                .flat_map(|config| machine.successors(config).into_iter().map(Arc::new))
                .collect()
        }
    }

    /// Decides whether `frontier` ends the simulation.
    fn settle(&self, frontier: &Frontier) -> Option<Verdict> {
        if let Some(accepting) = frontier
            .iter()
            .find(|config| self.machine.is_final(config.state()))
        {
            return Some(Verdict::Accepted(Configuration::clone(accepting)));
        }

        if frontier.is_empty() {
            return Some(Verdict::Rejected);
        }

        (self.steps >= self.config.step_bound).then_some(Verdict::Undecided)
    }
}

impl Iterator for Simulation<'_> {
    type Item = Frontier;

    fn next(&mut self) -> Option<Self::Item> {
        if self.verdict.is_some() {
            return None;
        }

        let frontier = match (self.initial.take(), self.current.take()) {
            (Some(initial), _) => Frontier::from([Arc::new(initial)]),
            (None, Some(previous)) => {
                self.steps += 1;
                self.expand(&previous)
            }
            (None, None) => return None,
        };

        debug!(
            "Step {}: {} live configuration(s)",
            self.steps,
            frontier.len()
        );

        match self.settle(&frontier) {
            Some(verdict) => {
                info!(
                    "Simulation of '{}' finished after {} step(s): {}",
                    self.machine.name(),
                    self.steps,
                    match &verdict {
                        Verdict::Accepted(_) => "accepted",
                        Verdict::Rejected => "rejected",
                        Verdict::Undecided => "undecided",
                    }
                );
                self.verdict = Some(verdict);
            }
            None => self.current = Some(frontier.clone()),
        }

        Some(frontier)
    }
}

/// The result of running a simulation to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// The input that was simulated.
    pub input: String,
    /// How the simulation ended.
    pub verdict: Verdict,
    /// The last frontier produced.
    pub frontier: Frontier,
    /// The number of steps taken.
    pub steps: usize,
}

impl Run {
    pub fn is_accepted(&self) -> bool {
        self.verdict.is_accepted()
    }

    /// Returns an accepting configuration, if there is one.
    pub fn witness(&self) -> Option<&Configuration> {
        match &self.verdict {
            Verdict::Accepted(config) => Some(config),
            _ => None,
        }
    }

    /// Turns a non-accepting run into `MachineError::Rejected`, for callers that prefer to
    /// treat rejection as an error.
    pub fn into_result(self) -> Result<Configuration, MachineError> {
        match self.verdict {
            Verdict::Accepted(config) => Ok(config),
            _ => Err(MachineError::Rejected { input: self.input }),
        }
    }
}

/// Starts a lazy simulation of `input` that takes at most `step_bound` steps.
pub fn simulate<'a>(machine: &'a Machine, input: &str, step_bound: usize) -> Simulation<'a> {
    Simulation::with_config(
        machine,
        input,
        SimulationConfig::default().with_step_bound(step_bound),
    )
}

/// Runs a simulation of `input` with default settings to completion.
pub fn read_input(machine: &Machine, input: &str) -> Run {
    read_input_with(machine, input, SimulationConfig::default())
}

/// Runs a simulation of `input` to completion, keeping only the last frontier.
pub fn read_input_with(machine: &Machine, input: &str, config: SimulationConfig) -> Run {
    let mut simulation = Simulation::with_config(machine, input, config);
    let frontier = simulation.by_ref().last().unwrap_or_default();

    Run {
        input: input.to_string(),
        verdict: simulation.verdict.take().unwrap_or(Verdict::Undecided),
        frontier,
        steps: simulation.steps,
    }
}
