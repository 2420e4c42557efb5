//! This module provides the `DefinitionLoader` struct, responsible for loading machines from
//! files and strings in either the `.ntm` text notation or JSON.

use crate::machine::Machine;
use crate::parser::parse;
use crate::types::{Definition, Direction, MachineError, MAX_PROGRAM_SIZE};
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// The on-disk formats a machine can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The `.ntm` text notation.
    Text,
    /// A serialized [`Definition`].
    Json,
}

impl Format {
    /// Picks a format from a file extension. Unknown extensions return `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ntm" => Some(Format::Text),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// `DefinitionLoader` is a utility struct for loading machines.
/// It provides methods to load a machine from a file, from string content, and to discover
/// and load every machine file within a directory.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a single machine from the specified file path.
    ///
    /// Files ending in `.json` are decoded as a serialized `Definition`; anything else is
    /// parsed as text notation.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the file is read, decoded and validated.
    /// * `Err(MachineError::FileError)` if the file cannot be read or is too large.
    /// * Any parse, decoding or validation error otherwise.
    pub fn load(path: &Path) -> Result<Machine, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!("Loading machine from {}", path.display());

        let format = Format::from_path(path).unwrap_or(Format::Text);
        Self::load_from_string(&content, format)
    }

    /// Loads a single machine from the provided string content.
    pub fn load_from_string(content: &str, format: Format) -> Result<Machine, MachineError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::FileError(format!(
                "Definition is {} bytes, the limit is {}",
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        match format {
            Format::Text => parse(content),
            Format::Json => {
                let value: Value = serde_json::from_str(content)?;
                check_directions(&value)?;

                let definition: Definition = serde_json::from_value(value)?;
                Machine::new(definition)
            }
        }
    }

    /// Serializes a machine's definition as pretty-printed JSON.
    pub fn to_json(machine: &Machine) -> Result<String, MachineError> {
        Ok(serde_json::to_string_pretty(machine.definition())?)
    }

    /// Loads every machine file (`.ntm` or `.json`) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each element of the result
    /// is either the path and its machine, or the error that prevented loading it.
    pub fn load_all(directory: &Path) -> Vec<Result<(PathBuf, Machine), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();
                if path.is_dir() || Format::from_path(&path).is_none() {
                    return None;
                }

                Some(Self::load(&path).map(|machine| (path, machine)))
            })
            .collect()
    }
}

/// Reports an unknown head movement in a JSON definition as `InvalidDirection`, the same
/// error the text notation gives, instead of a generic decoding error.
fn check_directions(value: &Value) -> Result<(), MachineError> {
    let outcomes = value
        .get("transitions")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|states| states.values())
        .filter_map(Value::as_object)
        .flat_map(|paths| paths.values())
        .filter_map(Value::as_array)
        .flatten();

    for outcome in outcomes {
        if let Some(direction) = outcome.get("direction").and_then(Value::as_str) {
            direction.parse::<Direction>()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const WALKER: &str = "name: Walker\nblank: .\ninput: [0]\nfinal: [q2]\nrules:\n  q0:\n    0 -> 0, R, q1\n  q1:\n    0 -> 0, L, q2";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a.ntm")), Some(Format::Text));
        assert_eq!(Format::from_path(Path::new("a.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("a.txt")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_load_valid_text_machine() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("walker.ntm");
        write_file(&file_path, WALKER);

        let machine = DefinitionLoader::load(&file_path).unwrap();
        assert_eq!(machine.name(), "Walker");
        assert_eq!(machine.initial_state(), "q0");
        assert!(machine.is_final("q2"));
    }

    #[test]
    fn test_load_invalid_machine() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.ntm");
        write_file(&file_path, "This is not a valid machine");

        assert!(DefinitionLoader::load(&file_path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = DefinitionLoader::load(&dir.path().join("absent.ntm"));

        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let machine = DefinitionLoader::load_from_string(WALKER, Format::Text).unwrap();
        let json = DefinitionLoader::to_json(&machine).unwrap();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("walker.json");
        write_file(&file_path, &json);

        let reloaded = DefinitionLoader::load(&file_path).unwrap();
        assert_eq!(reloaded, machine);
    }

    #[test]
    fn test_json_is_validated() {
        let json = r#"{
            "name": "Bad",
            "states": ["q0", "q1"],
            "input_symbols": ["a"],
            "tape_symbols": ["a", "_"],
            "transitions": { "q1": { "a": [{ "next_state": "q0", "write": "a", "direction": "R" }] } },
            "initial_state": "q0",
            "final_states": ["q1"]
        }"#;

        let result = DefinitionLoader::load_from_string(json, Format::Json);
        assert_eq!(result, Err(MachineError::FinalState("q1".to_string())));
    }

    #[test]
    fn test_malformed_json() {
        let result = DefinitionLoader::load_from_string("{ \"name\": ", Format::Json);
        assert!(matches!(result, Err(MachineError::DefinitionError(_))));
    }

    #[test]
    fn test_json_invalid_direction() {
        let json = r#"{
            "name": "Sideways",
            "states": ["q0", "q1"],
            "input_symbols": ["a"],
            "tape_symbols": ["a", "_"],
            "transitions": { "q0": { "a": [{ "next_state": "q1", "write": "a", "direction": "X" }] } },
            "initial_state": "q0",
            "final_states": ["q1"]
        }"#;

        let result = DefinitionLoader::load_from_string(json, Format::Json);
        assert!(matches!(
            result,
            Err(MachineError::InvalidDirection(d)) if d.starts_with('X')
        ));
    }

    #[test]
    fn test_json_accepts_text_direction_spellings() {
        let json = r#"{
            "states": ["q0", "q1"],
            "input_symbols": ["a"],
            "tape_symbols": ["a", "_"],
            "transitions": { "q0": { "a": [
                { "next_state": "q1", "write": "a", "direction": ">" },
                { "next_state": "q1", "write": "a", "direction": "S" }
            ] } },
            "initial_state": "q0",
            "final_states": ["q1"]
        }"#;

        let machine = DefinitionLoader::load_from_string(json, Format::Json).unwrap();
        assert_eq!(machine.transitions("q0", 'a').count(), 2);
    }

    #[test]
    fn test_oversized_definition() {
        let content = "#".repeat(MAX_PROGRAM_SIZE + 1);
        let result = DefinitionLoader::load_from_string(&content, Format::Text);

        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_load_all_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.ntm"), WALKER);
        write_file(&dir.path().join("invalid.ntm"), "This is not a valid machine");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");

        let machine = DefinitionLoader::load_from_string(WALKER, Format::Text).unwrap();
        write_file(
            &dir.path().join("valid.json"),
            &DefinitionLoader::to_json(&machine).unwrap(),
        );

        let results = DefinitionLoader::load_all(dir.path());
        assert_eq!(results.len(), 3);

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(success_count, 2);
    }

    #[test]
    fn test_load_all_missing_directory() {
        let dir = tempdir().unwrap();
        let results = DefinitionLoader::load_all(&dir.path().join("nope"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
