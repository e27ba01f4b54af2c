//! csvpool CLI: split a large CSV file into per-value files under a fixed
//! open-file budget.

mod split;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use csvpool_core::config::{parse_char, PoolConfig};

use split::{split_file, CliError};

#[derive(Parser)]
#[command(name = "csvpool")]
#[command(about = "Fan CSV rows out to many files without exhausting file handles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a headed CSV file into one file per value of a column
    Split {
        /// Input CSV file (first line is the header)
        #[arg(short, long)]
        input: PathBuf,

        /// Column whose value picks the destination file
        #[arg(long)]
        by: String,

        /// Directory receiving `<value>.csv` files
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Pool config file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum simultaneously open output files (overrides config)
        #[arg(long)]
        max_open: Option<usize>,

        /// Output delimiter (overrides config)
        #[arg(long)]
        delimiter: Option<String>,

        /// Input delimiter
        #[arg(long, default_value = ",")]
        input_delimiter: String,

        /// Do not write header lines to output files
        #[arg(long)]
        no_header: bool,
    },

    /// Print the effective pool configuration as YAML
    Config {
        /// Pool config file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        for hint in e.suggestions() {
            eprintln!("  hint: {hint}");
        }
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Split {
            input,
            by,
            out_dir,
            config,
            max_open,
            delimiter,
            input_delimiter,
            no_header,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(n) = max_open {
                cfg.max_open_files = n;
            }
            if let Some(d) = delimiter {
                cfg.dialect.delimiter =
                    parse_char(&d, "delimiter").map_err(|e| e.with_context("--delimiter"))?;
            }
            if no_header {
                cfg.write_header = false;
            }
            cfg.validate()?;
            let input_delimiter = parse_char(&input_delimiter, "input delimiter")
                .map_err(|e| e.with_context("--input-delimiter"))?;

            let summary = split_file(&cfg, &input, &by, &out_dir, input_delimiter)?;
            println!("✓ Split {} rows into {} files", summary.rows, summary.files);
            println!("  Writers opened: {}", summary.stats.opened);
            println!("  Evictions: {}", summary.stats.evicted);
            println!("  Peak open files: {} (cap {})", summary.stats.peak_open, cfg.max_open_files);
            if summary.warnings > 0 {
                println!("  Warnings: {}", summary.warnings);
            }
        }
        Commands::Config { config } => {
            let cfg = load_config(config.as_deref())?;
            cfg.validate()?;
            print!("{}", serde_yaml::to_string(&cfg)?);
        }
    }
    Ok(())
}

/// Defaults, then the YAML file, then `CSVPOOL_*` environment variables.
fn load_config(path: Option<&Path>) -> Result<PoolConfig, CliError> {
    let mut cfg = match path {
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|source| CliError::Input {
                path: p.to_path_buf(),
                source,
            })?;
            serde_yaml::from_str(&text)?
        }
        None => PoolConfig::default(),
    };
    cfg.apply_env()?;
    tracing::debug!(?cfg, "effective configuration");
    Ok(cfg)
}
