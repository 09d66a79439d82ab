//! kleene - regex to minimal DFA compiler.
//!
//! Usage:
//!   kleene check <regex> [strings]...      # Compile and simulate the strings on every stage
//!   kleene check <regex> -a ab -r ba       # Same, with expected verdicts
//!   kleene batch cases.toml                # Run every [[case]] of the file
//!   kleene --show all check <regex>        # Also print the transition tables

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use kleene::{load_config, run_batch, Case, DriverConfig, ShowOptions};

#[derive(Parser)]
#[command(name = "kleene")]
#[command(about = "Compile regular expressions into minimal DFAs", long_about = None)]
struct Cli {
    /// Log the compilation stages, repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file, its [compile] table sets the defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fail when the DFA needs more states than this, 0 never fails
    #[arg(long, global = true)]
    max_states: Option<usize>,

    /// Never stop the subset construction
    #[arg(long, global = true, conflicts_with = "max_states")]
    no_limit: bool,

    /// Skip the structural validators
    #[arg(long, global = true)]
    no_validate: bool,

    /// Transition tables to print
    #[arg(long, value_enum, global = true)]
    show: Vec<Stage>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one regex and simulate strings on every stage
    Check {
        regex: String,

        /// Strings to simulate without an expected verdict
        strings: Vec<String>,

        /// Strings that must be accepted
        #[arg(short, long)]
        accept: Vec<String>,

        /// Strings that must be rejected
        #[arg(short, long)]
        reject: Vec<String>,
    },

    /// Run every case of a TOML file
    Batch {
        file: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Stage {
    Nfa,
    Dfa,
    Minimized,
    All,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("KLEENE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn show_options(stages: &[Stage]) -> ShowOptions {
    let all = stages.contains(&Stage::All);
    ShowOptions {
        nfa: all || stages.contains(&Stage::Nfa),
        dfa: all || stages.contains(&Stage::Dfa),
        minimized: all || stages.contains(&Stage::Minimized),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DriverConfig::default(),
    };

    match cli.command {
        Commands::Check { regex, strings, accept, reject } => {
            config.cases = vec![Case { regex, accept, reject, probe: strings }];
        },
        Commands::Batch { file } => {
            let loaded = load_config(&file)?;
            if cli.config.is_none() {
                config.compile = loaded.compile;
            }
            config.cases = loaded.cases;
        },
    }

    if let Some(max_states) = cli.max_states {
        config.compile.max_dfa_states = Some(max_states).filter(|x| *x != 0);
    }
    if cli.no_limit {
        config.compile.max_dfa_states = None;
    }
    if cli.no_validate {
        config.compile.validate = false;
    }

    let stdout = io::stdout();
    let outcomes = run_batch(&mut stdout.lock(), &config, show_options(&cli.show))?;

    if outcomes.iter().any(|x| !x.passed()) {
        process::exit(1);
    }
    Ok(())
}
