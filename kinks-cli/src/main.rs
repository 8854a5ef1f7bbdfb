//! Command-line tools for the polygon self-intersection validator.
//!
//! Provides:
//! - `check`: report the kinks of a feature stored as JSON
//! - `render`: draw a feature and its kinks as SVG
//! - `replay`: run a scripted editing session through the debounced validator in real time

mod check;
mod render;
mod replay;

use std::fs::{self, File};
use std::io::BufReader;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use kinks_core::{extract_polygon, Feature, ValidatorConfig};

use check::CheckReport;
use render::{render_svg, RenderConfig};
use replay::Session;

#[derive(Parser)]
#[command(name = "kinks")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KINKS_BUILD_SHA"), ")"))]
#[command(about = "Self-intersection checks for map polygons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the self-intersections of a feature.
    ///
    /// Exits 0 when the polygon is simple, 1 when it self-intersects, 2 when it can't be
    /// analysed.
    Check {
        /// Feature file (JSON)
        path: String,

        /// Validator config overrides (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Print the report as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Render a feature's ring and kink markers to SVG
    Render {
        /// Feature file (JSON)
        path: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Validator config overrides (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Label vertices with their indices
        #[arg(short, long)]
        labels: bool,
    },

    /// Replay a scripted editing session, printing renderer instructions as JSON lines
    Replay {
        /// Session file (JSON)
        path: String,

        /// Validator config overrides (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn load_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path))
}

fn load_config(path: Option<&str>) -> Result<ValidatorConfig> {
    match path {
        Some(path) => load_json(path),
        None => Ok(ValidatorConfig::default()),
    }
}

fn run(command: Commands) -> Result<u8> {
    match command {
        Commands::Check { path, config, json } => {
            let config = load_config(config.as_deref())?;
            let feature: Feature = load_json(&path)?;
            let report = CheckReport::new(&feature, &config.detector);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
            Ok(report.exit_status())
        }
        Commands::Render { path, output, config, labels } => {
            let config = load_config(config.as_deref())?;
            let feature: Feature = load_json(&path)?;
            let polygon = extract_polygon(&feature).with_context(|| format!("reading {}", path))?;
            let kinks = polygon.kinks_with(&config.detector);
            let render_config = RenderConfig { show_labels: labels, ..RenderConfig::default() };
            let svg = render_svg(&polygon, &kinks, &render_config)?;
            match output {
                Some(output) => {
                    fs::write(&output, svg).with_context(|| format!("writing {}", output))?;
                    eprintln!("Wrote {} ({} kinks)", output, kinks.len());
                }
                None => print!("{}", svg),
            }
            Ok(0)
        }
        Commands::Replay { path, config } => {
            let config = load_config(config.as_deref())?;
            let session: Session = load_json(&path)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let summary = runtime.block_on(replay::replay(session, config, |record| {
                match serde_json::to_string(record) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::error!("Failed to serialize {:?}: {}", record, e),
                }
            }));
            eprintln!("{} passes, final status {:?}", summary.passes, summary.status);
            Ok(0)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
