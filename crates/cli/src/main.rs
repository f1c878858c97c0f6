mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use c12n_core::{
    apply_rules, color_for, max_classification, normalize, parse, C12nError, DisplayFormat,
    OriginalDefinition,
};

use crate::config::{load_config, DEFAULT_CONFIG};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "c12n", version = VERSION, about = "Classification marking normalizer")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Flattened definition file (JSON, or YAML by extension).
    #[arg(long, global = true)]
    definition: Option<PathBuf>,
    /// Authoring-form definition file, compiled before use.
    #[arg(long, global = true)]
    original: Option<PathBuf>,
    #[arg(long, global = true, value_parser = parse_format)]
    format: Option<DisplayFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Normalize {
        #[arg(required = true)]
        markings: Vec<String>,
    },
    Parts {
        marking: String,
    },
    Color {
        marking: String,
    },
    Max {
        first: String,
        second: String,
    },
    Rules {
        marking: String,
        #[arg(long, action = ArgAction::SetTrue)]
        user: bool,
    },
    Compile {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let file_config = load_config(&config_path)?;
    let format = file_config.format(cli.format)?;

    let load_definition =
        || file_config.load_definition(cli.definition.as_deref(), cli.original.as_deref());

    match cli.command {
        Commands::Normalize { markings } => {
            let definition = load_definition()?;
            for marking in markings {
                println!("{}", normalize(&marking, &definition, format));
            }
        }
        Commands::Parts { marking } => {
            let definition = load_definition()?;
            let parts = parse(&marking, &definition, format);
            println!("{}", serde_json::to_string_pretty(&parts)?);
        }
        Commands::Color { marking } => {
            let definition = load_definition()?;
            println!("{}", color_for(&marking, &definition, format));
        }
        Commands::Max { first, second } => {
            let definition = load_definition()?;
            println!(
                "{}",
                max_classification(&first, &second, &definition, format)
            );
        }
        Commands::Rules { marking, user } => {
            let definition = load_definition()?;
            let parts = parse(&marking, &definition, format);
            let outcome = apply_rules(parts, &definition, format, user);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Compile { input, out } => compile(&input, out.as_deref())?,
    }
    Ok(())
}

fn compile(input: &Path, out: Option<&Path>) -> Result<()> {
    let definition = OriginalDefinition::load(input)
        .and_then(|original| original.compile())
        .with_context(|| format!("failed to compile {}", input.display()))?;
    let json = serde_json::to_string_pretty(&definition)?;
    match out {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(out = %path.display(), "wrote compiled definition");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_format(value: &str) -> std::result::Result<DisplayFormat, String> {
    value.parse().map_err(|e: C12nError| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
