//! # srdservice Main Entry Point
//!
//! Loads the SRD reference data and answers one query per invocation,
//! printing JSON to stdout.

use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use srdservice::{config, GenerationConfig, SrdRepository, SrdResult, SrdSection};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Command line arguments for srdservice.
#[derive(Parser, Debug)]
#[command(name = "srdservice")]
#[command(about = "Balanced combat encounters over SRD reference data")]
#[command(version)]
struct Args {
    /// Directory holding the SRD JSON files
    #[arg(long, env = config::SRD_BASE_PATH_ENV, default_value = config::DEFAULT_SRD_PATH)]
    srd_path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a combat encounter for a party
    Encounter {
        /// Character levels, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        levels: Vec<u32>,

        /// Difficulty tier (easy, medium, hard, deadly)
        #[arg(long)]
        difficulty: Option<String>,

        /// Random seed for reproducible encounters
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Look up a monster by name
    Monster { name: String },
    /// Look up a spell by name
    Spell { name: String },
    /// Search a section by name or field content
    Search { section: SrdSection, query: String },
    /// Print a whole section
    Section { section: SrdSection },
    /// Report whether reference data loaded
    Health,
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting srdservice v{}", srdservice::VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes env_logger at the requested level. `RUST_LOG` still wins when
/// set.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn run(args: &Args) -> SrdResult<()> {
    match &args.command {
        Command::Health => {
            // A failed load reports a cold repository instead of an error.
            let repository = SrdRepository::load(&args.srd_path).unwrap_or_else(|e| {
                error!("{}", e);
                SrdRepository::default()
            });
            print_json(&repository.health())
        }
        command => {
            let repository = SrdRepository::load(&args.srd_path)?;
            run_query(&repository, command)
        }
    }
}

fn run_query(repository: &SrdRepository, command: &Command) -> SrdResult<()> {
    match command {
        Command::Encounter {
            levels,
            difficulty,
            seed,
        } => {
            let config = GenerationConfig::new(*seed);
            let difficulty = difficulty
                .clone()
                .unwrap_or_else(|| config.default_difficulty.to_string());
            let mut rng = srdservice::generation::utils::create_rng(&config);
            let encounter = repository.encounter(levels, &difficulty, &mut rng)?;
            print_json(&encounter)
        }
        Command::Monster { name } => print_json(repository.find(SrdSection::Monsters, name)?),
        Command::Spell { name } => print_json(repository.find(SrdSection::Spells, name)?),
        Command::Search { section, query } => {
            let results = repository.search(*section, query)?;
            print_json(&serde_json::json!({ "results": results }))
        }
        Command::Section { section } => print_json(repository.section(*section)?),
        Command::Health => print_json(&repository.health()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> SrdResult<()> {
    let text = serde_json::to_string_pretty(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    Ok(())
}
