//! fibfork CLI
//!
//! Reads a term count from standard input, forks, and has the child print
//! that many Fibonacci terms while the parent waits for it.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use fibfork_runtime::{Config, Sequencer, logging};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};

#[derive(ClapParser)]
#[command(name = "fibfork")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fork a child that prints Fibonacci terms while the parent waits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Do not print the input prompt
    #[arg(long)]
    no_prompt: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => run_completions(shell),
        None => run_sequencer(cli.config.as_deref(), cli.no_prompt),
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "fibfork", &mut io::stdout());
}

fn run_sequencer(config_path: Option<&std::path::Path>, no_prompt: bool) {
    let mut config = match config_path {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };
    if no_prompt {
        config.prompt = false;
    }

    logging::init(&config.log);
    debug!(?config, "starting");

    let sequencer = Sequencer::new(config);
    match sequencer.run(io::stdin().lock()) {
        Ok(outcome) => {
            debug!(child = outcome.child, status = %outcome.status, "run complete");
        }
        Err(e) => {
            error!("{}", e);
            process::exit(e.exit_code());
        }
    }
}
