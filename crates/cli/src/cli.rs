//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ufoproc_core::ProcessOptions;

use crate::commands::{format, info, normalize, plan, rules, validate};

#[derive(Parser)]
#[command(name = "ufoproc")]
#[command(about = "Inspect, validate, normalize and plan designspace documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize axes, sources, instances and rules
    Info {
        #[arg(required = true)]
        document: PathBuf,
    },
    /// Report problems; fails when any document has errors
    Validate {
        #[arg(required = true)]
        documents: Vec<PathBuf>,
    },
    /// Show what the rules turn each glyph into at a location
    Rules {
        #[arg(required = true)]
        document: PathBuf,
        /// Axis value, repeatable; missing axes use their default
        #[arg(long = "at", value_name = "NAME=VALUE", value_parser = parse_axis_value)]
        at: Vec<(String, f64)>,
        #[arg(required = true)]
        glyphs: Vec<String>,
    },
    /// Write the document with all locations normalized to -1..1
    Normalize {
        #[arg(required = true)]
        document: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Read and rewrite a document; prints it when no output is given
    Format {
        #[arg(required = true)]
        document: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Plan instances for a document or a directory of documents
    Plan {
        #[arg(required = true)]
        path: PathBuf,
        #[arg(long, default_value_t = ufoproc_core::config::DEFAULT_UFO_VERSION)]
        ufo_version: u32,
        #[arg(long)]
        no_rules: bool,
        #[arg(long)]
        round_geometry: bool,
    },
}

fn parse_axis_value(s: &str) -> Result<(String, f64), String> {
    let (name, value_str) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid axis value '{s}', expected NAME=VALUE"))?;
    if name.is_empty() {
        return Err(format!("Missing axis name in '{s}'"));
    }
    let value: f64 = value_str
        .parse()
        .map_err(|_| format!("Invalid value '{value_str}' for axis '{name}'"))?;
    Ok((name.to_string(), value))
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Info { document } => info(&document)?,
            Commands::Validate { documents } => validate(&documents)?,
            Commands::Rules { document, at, glyphs } => rules(&document, &at, &glyphs)?,
            Commands::Normalize { document, output } => normalize(&document, &output)?,
            Commands::Format { document, output } => format(&document, output.as_deref())?,
            Commands::Plan { path, ufo_version, no_rules, round_geometry } => {
                let options = ProcessOptions::new()
                    .ufo_version(ufo_version)
                    .process_rules(!no_rules)
                    .round_geometry(round_geometry);
                plan(&path, &options)?;
            }
        }
        Ok(())
    }
}
