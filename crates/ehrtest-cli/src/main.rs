//! ehrtest CLI
//!
//! Command-line access to the payload comparator for shell-driven test
//! suites and CI steps.

use clap::{Parser, Subcommand};
use ehrtest_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ehrtest")]
#[command(about = "ehrtest - openEHR API payload assertions", long_about = None)]
struct Cli {
    /// Emit structured logs to stderr (dev, json)
    #[arg(long, global = true)]
    log: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare an actual payload against an expected fixture
    Compare(commands::compare::CompareArgs),
    /// Force the number of named items in a fixture array
    Normalize(commands::normalize::NormalizeArgs),
    /// Show the selected system-under-test profile
    Sut(commands::sut::SutArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Some(profile) = cli.log {
        logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args),
        Commands::Normalize(args) => commands::normalize::execute(args),
        Commands::Sut(args) => commands::sut::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
