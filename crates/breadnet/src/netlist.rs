use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use breadnet_core::ResolveResponse;
use clap::{Args, ValueEnum};

use crate::input::{get_output_writer, print_warnings, ResolveArgs};

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum NetlistFormat {
    /// SPICE text
    #[default]
    Spice,
    /// JSON response body, as served over HTTP
    Json,
}

impl std::fmt::Display for NetlistFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetlistFormat::Spice => write!(f, "spice"),
            NetlistFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug)]
#[command(about = "Generate a SPICE netlist from breadboard detections")]
pub struct NetlistArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Output file; `-` writes stdout
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        value_hint = clap::ValueHint::FilePath,
        default_value = "-",
    )]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, default_value_t = NetlistFormat::Spice)]
    pub format: NetlistFormat,
}

pub fn execute(args: NetlistArgs) -> Result<()> {
    let (input, config) = args.resolve.load()?;
    let result = input.resolve(&config);
    let mut out = get_output_writer(&args.output.to_string_lossy())?;

    match args.format {
        NetlistFormat::Spice => match result {
            Ok(resolution) => {
                print_warnings(&resolution.warnings);
                write!(out, "{}", resolution.netlist).context("Failed to write netlist")?;
                out.flush()?;
                Ok(())
            }
            Err(err) => {
                print_warnings(&err.warnings());
                anyhow::bail!("No netlist generated: {err}")
            }
        },
        NetlistFormat::Json => {
            let response = ResolveResponse::from_result(result);
            serde_json::to_writer_pretty(&mut out, &response)
                .context("Failed to write JSON response")?;
            writeln!(out)?;
            out.flush()?;
            if response.status() != 200 {
                anyhow::bail!("No netlist generated (status {})", response.status());
            }
            Ok(())
        }
    }
}
