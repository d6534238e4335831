//! Darpack CLI - OpenShift List/Template exports to XL Deploy packages

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;
mod util;

use commands::package::PackageArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "darpack")]
#[command(author = "Darpack Contributors")]
#[command(version)]
#[command(about = "Turn OpenShift List/Template exports into XL Deploy deployment packages", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a .dar package from a List or Template document
    Package(PackageArgs),

    /// Show the contents of a .dar package
    Inspect {
        /// Archive path
        #[arg(default_value = "package.dar")]
        archive: PathBuf,

        /// Print only the manifest
        #[arg(long)]
        manifest: bool,
    },
}

fn init_tracing(debug: bool) {
    let default_level = if debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Package(args) => commands::package::run(&args),
        Commands::Inspect { archive, manifest } => commands::inspect::run(&archive, manifest),
    };

    if let Err(report) = result {
        eprintln!("{:?}", report);
        std::process::exit(CliError::exit_code_for(&report));
    }
}
