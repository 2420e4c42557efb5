//! Instantaneous descriptions of a running machine.

use crate::tape::Tape;
use crate::types::State;
use std::fmt;

/// One branch of the computation at a given step: the current state and a tape snapshot.
///
/// Equality and hashing are structural, so identical branches reached along different
/// nondeterministic paths collapse into a single entry of a frontier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    state: State,
    tape: Tape,
}

impl Configuration {
    pub fn new(state: impl Into<State>, tape: Tape) -> Self {
        Self {
            state: state.into(),
            tape,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the tape snapshot.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }
}

/// Renders `state: tape` with a caret under the head on the following line.
///
/// ```text
/// q1: 01.
///       ^
/// ```
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.state.chars().count() + 2;
        writeln!(f, "{}: {}", self.state, self.tape)?;
        write!(f, "{:>width$}", "^", width = prefix + self.tape.head() + 1)
    }
}
