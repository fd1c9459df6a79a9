//! # Adapter Configuration Validator
//!
//! Command-line tool for checking adapter configuration before handing it to a
//! running registry. Every violation is printed, not just the first.

use adapter_runtime::config::BootstrapConfig;
use adapter_runtime::constants::bootstrap;
use adapter_runtime::runtime::{
    descriptor, ConfigMarshaller, ConfigTransport, ConfigValidator, DefaultPreProcessorLoader,
    DefaultValidator, FileTransport, JsonMarshaller, PreProcessorLoader,
};
use adapter_runtime::ConfigLocation;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate adapter configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Bootstrap configuration (TOML), defaults to ./bootstrap.toml when present;
    /// environment overrides apply either way
    #[arg(short, long)]
    bootstrap: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate an adapter configuration file
    Validate {
        /// Configuration location (path or file:// URL)
        location: String,
    },

    /// Show the fields accepted by a configurable type
    Describe {
        /// Type name, e.g. split-join
        type_name: String,
    },

    /// List every configurable type
    Types,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = match &cli.command {
        Commands::Validate { location } => validate(&cli, location),
        Commands::Describe { type_name } => describe(type_name),
        Commands::Types => {
            for name in descriptor::known_types() {
                println!("{name}");
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => {
            info!("config-validator completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("config-validator failed: {e:#}");
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

fn validate(cli: &Cli, location: &str) -> Result<()> {
    let bootstrap_path = cli.bootstrap.clone().or_else(|| {
        let default = PathBuf::from(bootstrap::DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    });
    let config = BootstrapConfig::load(bootstrap_path.as_deref())
        .context("loading bootstrap configuration")?;
    let location: ConfigLocation = location.parse()?;

    let text = FileTransport
        .read_to_string(&location)
        .with_context(|| format!("reading {location}"))?;
    let processed = DefaultPreProcessorLoader.load(&config)?.process(&text)?;
    let definition = JsonMarshaller.unmarshal(&processed)?;

    match DefaultValidator.validate(&definition) {
        Ok(()) => {
            match cli.format.as_str() {
                "json" => println!(
                    "{}",
                    serde_json::json!({ "location": location.to_string(), "valid": true })
                ),
                _ => println!("{location}: OK ({} channels)", definition.channels.len()),
            }
            Ok(())
        }
        Err(error) => {
            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(error.violations())?),
                _ => {
                    for violation in error.violations() {
                        println!("{violation}");
                    }
                }
            }
            bail!("{location}: {} violation(s)", error.len())
        }
    }
}

fn describe(type_name: &str) -> Result<()> {
    let Some(descriptor) = descriptor::class_descriptor(type_name) else {
        bail!(
            "unknown type '{type_name}', expected one of: {}",
            descriptor::known_types().join(", ")
        );
    };
    println!("{}", serde_json::to_string_pretty(descriptor)?);
    Ok(())
}
