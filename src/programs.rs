use crate::machine::Machine;
use crate::parser::parse;
use crate::types::MachineError;
use log::error;

// Embedded machine definitions
const MACHINE_TEXTS: [&str; 6] = [
    include_str!("../machines/zero-walker.ntm"),
    include_str!("../machines/branching-ones.ntm"),
    include_str!("../machines/abc.ntm"),
    include_str!("../machines/equal-ab.ntm"),
    include_str!("../machines/contains-11.ntm"),
    include_str!("../machines/endless-walker.ntm"),
];

lazy_static::lazy_static! {
    /// Every embedded machine that parsed, paired with its source text.
    pub static ref MACHINES: Vec<(Machine, &'static str)> = MACHINE_TEXTS
        .iter()
        .filter_map(|text| match parse(text) {
            Ok(machine) => Some((machine, *text)),
            Err(e) => {
                error!("Failed to parse embedded machine: {}", e);
                None
            }
        })
        .collect();
}

/// Read-only access to the machines compiled into the crate.
pub struct MachineCatalog;

impl MachineCatalog {
    /// Get the number of available machines
    pub fn count() -> usize {
        MACHINES.len()
    }

    /// Get a machine by its index
    pub fn by_index(index: usize) -> Result<Machine, MachineError> {
        MACHINES
            .get(index)
            .map(|(machine, _)| machine.clone())
            .ok_or_else(|| {
                MachineError::ValidationError(format!("Machine index {} out of range", index))
            })
    }

    /// Get a machine by its name
    pub fn by_name(name: &str) -> Result<Machine, MachineError> {
        MACHINES
            .iter()
            .find(|(machine, _)| machine.name() == name)
            .map(|(machine, _)| machine.clone())
            .ok_or_else(|| MachineError::ValidationError(format!("Machine '{}' not found", name)))
    }

    /// List all machine names
    pub fn names() -> Vec<String> {
        MACHINES
            .iter()
            .map(|(machine, _)| machine.name().to_string())
            .collect()
    }

    /// Get a summary of a machine by its index
    pub fn info(index: usize) -> Result<MachineInfo, MachineError> {
        let machine = Self::by_index(index)?;
        let definition = machine.definition();

        Ok(MachineInfo {
            index,
            name: definition.name.clone(),
            initial_state: definition.initial_state.clone(),
            input_symbols: definition.input_symbols.iter().collect(),
            state_count: definition.states.len(),
            transition_count: definition.transition_count(),
        })
    }

    /// Search for machines by name, case-insensitively
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        MACHINES
            .iter()
            .enumerate()
            .filter(|(_, (machine, _))| machine.name().to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the source text of a machine by its index
    pub fn source_by_index(index: usize) -> Result<&'static str, MachineError> {
        MACHINES.get(index).map(|(_, text)| *text).ok_or_else(|| {
            MachineError::ValidationError(format!("Machine text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub input_symbols: String,
    pub state_count: usize,
    pub transition_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{read_input, simulate, Verdict};

    #[test]
    fn test_all_embedded_machines_parse() {
        assert_eq!(MachineCatalog::count(), MACHINE_TEXTS.len());
    }

    #[test]
    fn test_machine_names() {
        let names = MachineCatalog::names();
        assert!(names.contains(&"Zero walker".to_string()));
        assert!(names.contains(&"Branching ones".to_string()));
        assert!(names.contains(&"Equal a b c".to_string()));
        assert!(names.contains(&"Equal a and b".to_string()));
        assert!(names.contains(&"Contains 11".to_string()));
        assert!(names.contains(&"Endless walker".to_string()));
    }

    #[test]
    fn test_get_machine_by_index() {
        assert!(MachineCatalog::by_index(0).is_ok());
        assert!(MachineCatalog::by_index(999).is_err());
    }

    #[test]
    fn test_get_machine_by_name() {
        let machine = MachineCatalog::by_name("Branching ones").unwrap();
        assert_eq!(machine.initial_state(), "q0");

        assert!(MachineCatalog::by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_machine_info() {
        let info = MachineCatalog::info(2).unwrap();
        assert_eq!(info.index, 2);
        assert_eq!(info.name, "Equal a b c");
        assert_eq!(info.input_symbols, "abc");
        assert_eq!(info.state_count, 6);
        assert_eq!(info.transition_count, 16);

        assert!(MachineCatalog::info(999).is_err());
    }

    #[test]
    fn test_search() {
        assert_eq!(MachineCatalog::search("equal").len(), 2);
        assert_eq!(MachineCatalog::search("WALKER").len(), 2);
        assert!(MachineCatalog::search("nonexistent").is_empty());
    }

    #[test]
    fn test_source_by_index() {
        let text = MachineCatalog::source_by_index(0).unwrap();
        assert!(text.contains("name: Zero walker"));
        assert!(MachineCatalog::source_by_index(999).is_err());
    }

    #[test]
    fn test_zero_walker() {
        let machine = MachineCatalog::by_name("Zero walker").unwrap();

        assert!(read_input(&machine, "00").is_accepted());
        assert_eq!(read_input(&machine, "0").verdict, Verdict::Rejected);
    }

    #[test]
    fn test_equal_abc() {
        let machine = MachineCatalog::by_name("Equal a b c").unwrap();

        for accepted in ["abc", "aabbcc", "aaabbbccc"] {
            assert!(read_input(&machine, accepted).is_accepted(), "{accepted}");
        }
        for rejected in ["", "aabc", "abbc", "abcc", "acb"] {
            assert!(!read_input(&machine, rejected).is_accepted(), "{rejected}");
        }
    }

    #[test]
    fn test_equal_a_and_b() {
        let machine = MachineCatalog::by_name("Equal a and b").unwrap();

        for accepted in ["", "ab", "ba", "aabb", "abab", "bbaa"] {
            assert!(read_input(&machine, accepted).is_accepted(), "{accepted}");
        }
        for rejected in ["a", "aab", "aaabb", "bbb"] {
            assert!(!read_input(&machine, rejected).is_accepted(), "{rejected}");
        }
    }

    #[test]
    fn test_contains_11() {
        let machine = MachineCatalog::by_name("Contains 11").unwrap();

        assert!(read_input(&machine, "0101100").is_accepted());
        assert!(read_input(&machine, "11").is_accepted());
        assert!(!read_input(&machine, "010101").is_accepted());
    }

    #[test]
    fn test_endless_walker_is_cut_off() {
        let machine = MachineCatalog::by_name("Endless walker").unwrap();
        let mut simulation = simulate(&machine, "aaa", 25);

        assert_eq!(simulation.by_ref().count(), 26);
        assert_eq!(simulation.verdict(), Some(&Verdict::Undecided));
    }
}
