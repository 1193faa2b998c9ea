use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use roster::cli::{Cli, Commands};
use roster::commands::{self, EXIT_ERROR, scan::ScanOptions};
use roster::output::{self, Verbosity};
use std::io;
use std::process;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let cli = Cli::parse();

    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    output::set_verbosity(verbosity);
    init_tracing(verbosity);

    process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    match cli.command {
        Commands::Scan {
            dirs,
            file,
            update,
            threads,
        } => commands::scan::execute(
            &dirs,
            &ScanOptions {
                file,
                update,
                threads,
            },
        ),
        Commands::Init { dirs, file, force } => {
            match commands::init::execute(&dirs, &file, force) {
                Ok(()) => 0,
                Err(e) => {
                    output::error(&format!("{e:#}"));
                    EXIT_ERROR
                }
            }
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
            0
        }
    }
}

/// Log to stderr; `ROSTER_LOG` overrides the verbosity-derived filter.
fn init_tracing(verbosity: Verbosity) {
    let fallback = match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "roster=debug",
    };
    let filter =
        EnvFilter::try_from_env(roster::LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
