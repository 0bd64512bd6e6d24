//! `dexsync run`, `dexsync validate` and `dexsync defaults`.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use dexsync_recon::{Domain, SyncConfig};

use crate::exit_codes::{
    recon_exit_code, EXIT_CHECK_CHANGES, EXIT_SYNC_INVALID_CONFIG, EXIT_SYNC_RUNTIME, EXIT_USAGE,
};
use crate::fetch::SheetClient;
use crate::report::print_report;
use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainArg {
    Behaviour,
    Riding,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Behaviour => Domain::Behaviour,
            DomainArg::Riding => Domain::Riding,
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Which attribute block to sync
    pub domain: DomainArg,

    /// TOML config laid over the built-in defaults for the domain
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read the sheet from a local CSV export instead of downloading it
    #[arg(long, conflicts_with = "url")]
    pub csv: Option<PathBuf>,

    /// Sheet CSV URL (overrides the config)
    #[arg(long)]
    pub url: Option<String>,

    /// Species data directory (overrides the config)
    #[arg(long, env = "DEXSYNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Lowest dex number to sync
    #[arg(long)]
    pub dex_min: Option<i64>,

    /// Highest dex number to sync
    #[arg(long)]
    pub dex_max: Option<i64>,

    /// Remove blocks for blank rows (`--remove-blank false` keeps them)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub remove_blank: Option<bool>,

    /// Compute everything, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Like --dry-run, but exit 3 if any species file would change
    #[arg(long)]
    pub check: bool,

    /// Print the run result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Write the run result as JSON to a file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn sync_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError {
        code,
        message: msg.into(),
        hint: None,
    }
}

/// Read and parse a config file. A relative `data_dir` in the file is taken
/// relative to the file's directory.
fn load_config(path: &Path) -> Result<SyncConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        sync_err(
            EXIT_SYNC_RUNTIME,
            format!("cannot read config {}: {e}", path.display()),
        )
    })?;
    let mut config = SyncConfig::from_toml(&text)
        .map_err(|e| sync_err(EXIT_SYNC_INVALID_CONFIG, format!("{}: {e}", path.display())))?;

    if config.data_dir.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.data_dir = base.join(&config.data_dir);
    }
    Ok(config)
}

fn resolve_config(args: &RunArgs) -> Result<SyncConfig, CliError> {
    let domain = Domain::from(args.domain);

    let mut config = match args.config {
        Some(ref path) => {
            let config = load_config(path)?;
            if config.domain != domain {
                return Err(sync_err(
                    EXIT_SYNC_INVALID_CONFIG,
                    format!(
                        "{} is a {} config, not {domain}",
                        path.display(),
                        config.domain
                    ),
                ));
            }
            config
        }
        None => SyncConfig::for_domain(domain),
    };

    if let Some(ref url) = args.url {
        config.source_url = url.clone();
    }
    if let Some(ref dir) = args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.dex_min.is_some() || args.dex_max.is_some() {
        let mut range = config.dex_range.take().unwrap_or_default();
        if let Some(min) = args.dex_min {
            range.min = min;
        }
        if let Some(max) = args.dex_max {
            range.max = max;
        }
        config.dex_range = Some(range);
    }
    if let Some(remove) = args.remove_blank {
        config.remove_blank = remove;
    }

    config
        .validate()
        .map_err(|e| sync_err(EXIT_SYNC_INVALID_CONFIG, e.to_string()))?;
    Ok(config)
}

pub fn cmd_run(args: RunArgs, quiet: bool) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let dry_run = args.dry_run || args.check;

    let csv_text = match args.csv {
        Some(ref path) => std::fs::read_to_string(path).map_err(|e| CliError {
            code: EXIT_USAGE,
            message: format!("cannot read {}: {e}", path.display()),
            hint: Some("--csv expects a CSV export of the sheet".into()),
        })?,
        None => {
            tracing::info!(url = %config.source_url, "downloading sheet");
            SheetClient::new(&config.fetch)?.fetch_csv(&config.source_url)?
        }
    };

    let result = dexsync_recon::run(&config, &csv_text, dry_run)
        .map_err(|e| sync_err(recon_exit_code(&e), e.to_string()))?;

    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&result).map_err(|e| {
            sync_err(EXIT_SYNC_RUNTIME, format!("JSON serialization error: {e}"))
        })?;
        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str).map_err(|e| {
                sync_err(EXIT_SYNC_RUNTIME, format!("cannot write output: {e}"))
            })?;
            tracing::info!(path = %path.display(), "wrote run result");
        }
        if args.json {
            println!("{json_str}");
        }
    }

    if !quiet {
        print_report(&result);
    }

    if args.check && result.has_changes() {
        return Err(CliError {
            code: EXIT_CHECK_CHANGES,
            message: format!(
                "{} species file(s) out of date with the sheet",
                result.summary.changed_files
            ),
            hint: Some(format!("run `dexsync run {}` to update them", config.domain)),
        });
    }

    Ok(())
}

pub fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&path)?;
    eprintln!(
        "{}: ok ({} sheet, data dir {})",
        path.display(),
        config.domain,
        config.data_dir.display()
    );
    Ok(())
}

pub fn cmd_defaults(domain: DomainArg) -> Result<(), CliError> {
    let text = SyncConfig::for_domain(domain.into())
        .to_toml()
        .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, e.to_string()))?;
    print!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        run: RunArgs,
    }

    fn args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["dexsync"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).run
    }

    #[test]
    fn flags_override_domain_defaults() {
        let config = resolve_config(&args(&[
            "riding",
            "--data-dir",
            "/tmp/species",
            "--dex-min",
            "1",
            "--dex-max",
            "151",
            "--remove-blank",
            "false",
        ]))
        .unwrap();
        assert_eq!(config.domain, Domain::Riding);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/species"));
        let range = config.dex_range.unwrap();
        assert_eq!((range.min, range.max), (1, 151));
        assert!(!config.remove_blank);
    }

    #[test]
    fn bare_remove_blank_flag_enables_removal() {
        let config = resolve_config(&args(&["behaviour", "--remove-blank"])).unwrap();
        assert!(config.remove_blank);
    }

    #[test]
    fn inverted_dex_range_is_an_invalid_config() {
        let err = resolve_config(&args(&["behaviour", "--dex-min", "10", "--dex-max", "1"]))
            .unwrap_err();
        assert_eq!(err.code, EXIT_SYNC_INVALID_CONFIG);
    }

    #[test]
    fn config_data_dir_is_relative_to_the_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("riding.toml");
        std::fs::write(&path, "domain = \"riding\"\ndata_dir = \"species\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.data_dir, tmp.path().join("species"));
    }

    #[test]
    fn config_for_another_domain_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("riding.toml");
        std::fs::write(&path, "domain = \"riding\"\n").unwrap();

        let err = resolve_config(&args(&["behaviour", "--config", path.to_str().unwrap()]))
            .unwrap_err();
        assert_eq!(err.code, EXIT_SYNC_INVALID_CONFIG);
        assert!(err.message.contains("not behaviour"));
    }
}
