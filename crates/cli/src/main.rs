// dexsync - sync species data files with the behaviour and riding design sheets

mod exit_codes;
mod fetch;
mod report;
mod sync;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::EXIT_SUCCESS;
use sync::{DomainArg, RunArgs};

#[derive(Parser)]
#[command(name = "dexsync")]
#[command(about = "Sync species data files with the published design sheets")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Only log warnings and errors, skip the run report
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a sheet into the species files
    #[command(after_help = "\
Examples:
  dexsync run behaviour
  dexsync run riding --csv riding.csv --dry-run
  dexsync run riding --config riding.toml --check
  dexsync run behaviour --dex-min 1 --dex-max 151 --json")]
    Run(RunArgs),

    /// Parse and validate a config file without running
    #[command(after_help = "\
Examples:
  dexsync validate riding.toml")]
    Validate {
        /// Path to the TOML config
        config: PathBuf,
    },

    /// Print the built-in config for a domain as TOML
    #[command(after_help = "\
Examples:
  dexsync defaults riding > riding.toml")]
    Defaults {
        domain: DomainArg,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("DEXSYNC_COMMIT"), ")",
        "\nengine:  dexsync-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("DEXSYNC_TARGET"),
    )
}

fn init_tracing(quiet: bool) {
    let default = if quiet {
        "dexsync=warn,dexsync_recon=warn"
    } else {
        "dexsync=info,dexsync_recon=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match cli.command {
        Commands::Run(args) => sync::cmd_run(args, cli.quiet),
        Commands::Validate { config } => sync::cmd_validate(config),
        Commands::Defaults { domain } => sync::cmd_defaults(domain),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
