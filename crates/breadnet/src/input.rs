use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use breadnet_core::{CircuitInput, ResolveConfig, Severity, Warning};
use clap::Args;
use colored::Colorize;

/// Input and resolver settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Detection document (JSON); `-` reads stdin
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Resolver settings (TOML). Replaces any `config` embedded in the document
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Maximum wire-endpoint to terminal distance
    #[arg(long, value_name = "DISTANCE")]
    pub tolerance: Option<f64>,

    /// Maximum distance at which two leads count as touching
    #[arg(long, value_name = "DISTANCE")]
    pub coincidence: Option<f64>,

    /// Title comment for the netlist
    #[arg(long)]
    pub title: Option<String>,

    /// Omit the trailing `.end` card
    #[arg(long)]
    pub no_end: bool,
}

impl ResolveArgs {
    /// Read the document and settle the effective configuration:
    /// `--config` file, else the document's own `config`, else defaults;
    /// command-line flags override whichever was chosen.
    pub fn load(&self) -> Result<(CircuitInput, ResolveConfig)> {
        let mut input = read_input(&self.file)?;

        let mut config = match &self.config {
            Some(path) => ResolveConfig::from_file(path)?,
            None => input.config.take().unwrap_or_default(),
        };
        if let Some(tolerance) = self.tolerance {
            config.match_tolerance_distance = tolerance;
        }
        if let Some(coincidence) = self.coincidence {
            config.coincidence_tolerance_distance = Some(coincidence);
        }
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if self.no_end {
            config.end_card = false;
        }
        input.config = None;

        log::debug!("effective config: {config:?}");
        Ok((input, config))
    }
}

fn read_input(path: &Path) -> Result<CircuitInput> {
    let (name, content) = if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read detections from stdin")?;
        ("<stdin>".to_string(), content)
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        (path.display().to_string(), content)
    };
    serde_json::from_str(&content).with_context(|| format!("Failed to parse detections in {name}"))
}

pub fn get_output_writer(path: &str) -> Result<Box<dyn Write>> {
    Ok(if path == "-" {
        Box::new(std::io::stdout()) // writes to stdout
    } else {
        Box::new(File::create(path).with_context(|| format!("Failed to create {path}"))?)
    })
}

/// Render warnings to stderr, one per line.
pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        let tag = match warning.severity {
            Severity::Info => "info".blue().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Error => "error".red().bold(),
        };
        eprintln!("{tag}[{}]: {}", warning.code, warning.message);
    }
}
