use atty::Stream;
use clap::Parser;
use log::debug;
use ntur::loader::{DefinitionLoader, Format};
use ntur::machine::Machine;
use ntur::programs::MachineCatalog;
use ntur::simulator::{Simulation, Verdict};
use ntur::types::{MachineError, SimulationConfig, DEFAULT_STEP_BOUND};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// The machine definition file (.ntm or .json) to run. Without this or --builtin,
    /// the definition is read from stdin
    #[clap(short, long, conflicts_with = "builtin")]
    machine: Option<PathBuf>,

    /// The name of a built-in machine to run
    #[clap(short, long)]
    builtin: Option<String>,

    /// An input string to decide; may be given several times
    #[clap(short, long)]
    input: Vec<String>,

    /// The maximum number of steps per input
    #[clap(short, long, default_value_t = DEFAULT_STEP_BOUND)]
    steps: usize,

    /// Print every frontier while exploring
    #[clap(short, long)]
    trace: bool,

    /// Expand frontiers on the current thread only
    #[clap(long)]
    sequential: bool,

    /// List the built-in machines and exit
    #[clap(short, long)]
    list: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list {
        list_machines();
        return;
    }

    let machine = match load_machine(&cli) {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let mut config = SimulationConfig::default().with_step_bound(cli.steps);
    if cli.sequential {
        config = config.sequential();
    }

    let inputs = if cli.input.is_empty() {
        vec![String::new()]
    } else {
        cli.input.clone()
    };

    let mut all_accepted = true;
    for input in &inputs {
        if let Err(e) = machine.validate_input(input) {
            eprintln!("{:?}: {}", input, e);
            all_accepted = false;
            continue;
        }

        all_accepted &= run(&machine, input, config, cli.trace);
    }

    if !all_accepted {
        process::exit(1);
    }
}

fn load_machine(cli: &Cli) -> Result<Machine, MachineError> {
    if let Some(path) = &cli.machine {
        return DefinitionLoader::load(path);
    }

    if let Some(name) = &cli.builtin {
        return MachineCatalog::by_name(name);
    }

    if atty::isnt(Stream::Stdin) {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| MachineError::FileError(format!("Failed to read stdin: {}", e)))?;

        let format = if content.trim_start().starts_with('{') {
            Format::Json
        } else {
            Format::Text
        };
        debug!("Reading machine from stdin as {:?}", format);

        return DefinitionLoader::load_from_string(&content, format);
    }

    Err(MachineError::FileError(
        "No machine given: use --machine, --builtin or pipe a definition on stdin".to_string(),
    ))
}

fn list_machines() {
    for index in 0..MachineCatalog::count() {
        if let Ok(info) = MachineCatalog::info(index) {
            println!(
                "{:>2}. {} (input [{}], {} states, {} transitions)",
                info.index, info.name, info.input_symbols, info.state_count, info.transition_count
            );
        }
    }
}

/// Decides one input and prints the outcome. Returns whether it was accepted.
fn run(machine: &Machine, input: &str, config: SimulationConfig, trace: bool) -> bool {
    let mut simulation = Simulation::with_config(machine, input, config);

    for (step, frontier) in simulation.by_ref().enumerate() {
        if !trace {
            continue;
        }

        println!("Step {}: {} configuration(s)", step, frontier.len());

        // Frontiers are unordered; sort for stable output.
        let mut lines: Vec<String> = frontier.iter().map(|c| c.to_string()).collect();
        lines.sort();
        for line in lines {
            println!("{}\n", line);
        }
    }

    let steps = simulation.steps();
    match simulation.verdict() {
        Some(Verdict::Accepted(witness)) => {
            println!("{:?}: accepted after {} step(s)", input, steps);
            println!("{}", witness);
            true
        }
        Some(Verdict::Rejected) => {
            println!("{:?}: rejected after {} step(s)", input, steps);
            false
        }
        Some(Verdict::Undecided) | None => {
            println!(
                "{:?}: undecided, step bound of {} reached",
                input, config.step_bound
            );
            false
        }
    }
}
