mod view;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;
use tsmerge_cli::{MergeArgs, StrategyChoice, load_config, run_merge_command};

use crate::view::run_view_command;

#[derive(Parser, Debug)]
#[command(name = "tsmerge", author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge several .ts catalogs into one.
    Merge {
        /// Input files, directories (every *.ts inside) or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// The output file to write the merged catalog to
        #[arg(short, long)]
        output: String,

        /// How to settle conflicting translations
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyChoice>,

        /// Drop vanished and obsolete messages from the output
        #[arg(long)]
        drop_vanished: bool,

        /// Keep losing translations as comments in the output
        #[arg(long)]
        keep_alternatives: bool,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,

        /// Also write the merge report as JSON to this path
        #[arg(long)]
        report_json: Option<String>,

        /// Config file (defaults to ./tsmerge.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// View a .ts catalog.
    View {
        /// The input file to view
        input: String,

        /// Display full text without truncation
        #[arg(long)]
        full: bool,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.commands {
        Commands::Merge {
            inputs,
            output,
            strategy,
            drop_vanished,
            keep_alternatives,
            force,
            report_json,
            config,
        } => load_config(config.as_deref()).and_then(|config| {
            run_merge_command(
                MergeArgs {
                    inputs,
                    output,
                    strategy,
                    drop_vanished,
                    keep_alternatives,
                    force,
                    report_json,
                },
                &config,
            )
        }),
        Commands::View { input, full } => run_view_command(&input, full),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Args::command(), "tsmerge", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
