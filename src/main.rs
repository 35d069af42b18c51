//! DFWC - Declarative Firewalld Compiler
//!
//! Command-line front end for the `dfwc` library.
//!
//! # Usage
//!
//! ```bash
//! dfwc check zones.yaml                       # Validate only
//! dfwc expand zones.yaml                      # Print the literal config
//! dfwc generate zones.yaml                    # Apply script
//! dfwc generate zones.yaml --remove --script  # Removal script with shebang
//! dfwc import setup.sh --merge zones.yaml --output zones.yaml
//! firewall-cmd ... | dfwc import -            # Read commands from stdin
//! dfwc config                                 # Show effective defaults
//! ```
//!
//! Diagnostics go to stderr; results go to stdout or `--output`.

use clap::{Parser, Subcommand};
use dfwc::config::{self, AppConfig, OutputFormat};
use dfwc::core::firewall::Config;
use dfwc::core::generate::{Direction, GenerateOptions, render};
use dfwc::core::pipeline::{Compilation, compile};
use dfwc::core::reverse::{ReverseOptions, reverse_parse};
use dfwc::core::{Diagnostic, document, merge, validate};
use dfwc::utils::{read_input, write_atomic};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "dfwc")]
#[command(about = "Declarative firewalld compiler - YAML zones to firewall-cmd and back", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config document and report errors and warnings
    Check {
        /// Config file (`-` for stdin)
        file: String,
    },
    /// Print the config with variables, loops and rule groups expanded
    Expand {
        /// Config file (`-` for stdin)
        file: String,
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Print the firewall-cmd lines for a config
    Generate {
        /// Config file (`-` for stdin)
        file: String,
        /// Emit the removal sequence instead of the apply sequence
        #[arg(long)]
        remove: bool,
        /// Also emit runtime lines and skip the reload
        #[arg(long)]
        transient: bool,
        /// Omit `# Zone:` and `# Direct rules` banners
        #[arg(long)]
        no_banners: bool,
        /// Prepend `#!/bin/sh` and `set -e`
        #[arg(long)]
        script: bool,
    },
    /// Rebuild a config from firewall-cmd lines
    Import {
        /// Command text (`-` for stdin)
        #[arg(default_value = "-")]
        file: String,
        /// Existing config to merge the imported fragment into
        #[arg(short, long, value_name = "CONFIG")]
        merge: Option<PathBuf>,
        /// Write the result here (atomically) instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Zone for modifying lines that carry no --zone
        #[arg(long, value_name = "ZONE")]
        default_zone: Option<String>,
    },
    /// Show the effective CLI defaults and where they are read from
    Config {
        /// Write the effective defaults to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app_config = config::load_config();
    match handle_cli(cli.command, &app_config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn report(label: &str, diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("{label}: {diag}");
    }
}

/// Compiles a document and prints its diagnostics
fn compile_file(file: &str) -> Result<Compilation, Box<dyn std::error::Error>> {
    let text = read_input(file)?;
    let result = compile(&text);
    report("warning", &result.warnings);
    report("error", &result.errors);
    Ok(result)
}

fn serialize(config: &Config, format: OutputFormat) -> dfwc::Result<String> {
    match format {
        OutputFormat::Yaml => config.to_yaml(),
        OutputFormat::Json => config.to_json(),
    }
}

/// Loads an existing config without expanding it, so templates survive a merge
fn load_existing(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let doc = document::load_path(path)?;
    let validation = validate::validate(&doc);
    report("warning", &validation.warnings);
    if !validation.is_ok() {
        report("error", &validation.errors);
        return Err(format!("{} is not a valid config", path.display()).into());
    }
    Ok(Config::from_document(&doc)?)
}

fn handle_cli(
    command: Commands,
    app_config: &AppConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Check { file } => {
            let result = compile_file(&file)?;
            let Some(config) = result.config() else {
                return Ok(ExitCode::FAILURE);
            };
            println!(
                "OK: {} zone(s), {} warning(s)",
                config.zones.len(),
                result.warnings.len()
            );
        }
        Commands::Expand { file, format } => {
            let result = compile_file(&file)?;
            let Some(config) = result.config() else {
                return Ok(ExitCode::FAILURE);
            };
            let format = format.unwrap_or(app_config.output_format);
            print!("{}", serialize(config, format)?);
        }
        Commands::Generate {
            file,
            remove,
            transient,
            no_banners,
            script,
        } => {
            let result = compile_file(&file)?;
            if !result.is_ok() {
                return Ok(ExitCode::FAILURE);
            }
            let direction = if remove {
                Direction::Remove
            } else {
                Direction::Apply
            };
            let options = GenerateOptions {
                transient: transient || app_config.transient,
                banners: app_config.banners && !no_banners,
            };
            let lines = result.commands(direction, &options);
            print!("{}", render(&lines, script));
        }
        Commands::Import {
            file,
            merge: merge_into,
            output,
            format,
            default_zone,
        } => {
            let text = read_input(&file)?;
            let options = ReverseOptions {
                default_zone: default_zone.unwrap_or_else(|| app_config.default_zone.clone()),
            };
            let parsed = reverse_parse(&text, &options);
            for err in &parsed.errors {
                eprintln!("error: {err}");
            }
            info!(
                parsed = parsed.parsed.len(),
                skipped = parsed.skipped.len(),
                "imported command lines"
            );

            let config = match merge_into {
                Some(ref path) => merge::merge(&load_existing(path)?, &parsed.config),
                None => parsed.config,
            };
            let body = serialize(&config, format.unwrap_or(app_config.output_format))?;

            match output {
                Some(path) => {
                    write_atomic(&path, &body)?;
                    info!("Wrote {}", path.display());
                }
                None => print!("{body}"),
            }
            if !parsed.errors.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Config { write } => {
            match config::config_path() {
                Some(path) => println!("# {}", path.display()),
                None => println!("# no config directory available"),
            }
            println!("{}", serde_json::to_string_pretty(app_config)?);
            if write && let Some(path) = config::save_config(app_config)? {
                info!("Wrote {}", path.display());
                eprintln!("Saved {}", path.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
