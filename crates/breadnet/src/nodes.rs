use std::io::{self, Write};

use anyhow::{Context, Result};
use breadnet_core::{NodeId, Resolution};
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use itertools::Itertools;

use crate::input::{print_warnings, ResolveArgs};

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

#[derive(Args, Debug)]
#[command(about = "List resolved nodes with their terminals and elements")]
pub struct NodesArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

pub fn execute(args: NodesArgs) -> Result<()> {
    let (input, config) = args.resolve.load()?;
    let resolution = match input.resolve(&config) {
        Ok(resolution) => resolution,
        Err(err) => {
            print_warnings(&err.warnings());
            anyhow::bail!("Failed to resolve nodes: {err}");
        }
    };
    print_warnings(&resolution.warnings);

    match args.format {
        OutputFormat::Table => write_node_table(&resolution, io::stdout().lock()),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout().lock(), &resolution.nodes)
                .context("Failed to write JSON nodes")?;
            println!();
            Ok(())
        }
    }
}

fn write_node_table<W: Write>(resolution: &Resolution, mut writer: W) -> Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(comfy_table::ContentArrangement::DynamicFullWidth);

    table.set_header(vec!["Node", "Role", "Terminals", "Elements"]);

    for node in &resolution.nodes {
        let role = if node.id == NodeId::Ground {
            "ground"
        } else if resolution.power.iter().any(|p| p.node == node.id) {
            "power"
        } else {
            ""
        };
        let elements = resolution
            .netlist
            .elements
            .iter()
            .filter(|e| e.nodes.contains(&node.id))
            .map(|e| e.name.as_str())
            .join(", ");
        table.add_row(vec![
            node.id.to_string(),
            role.to_string(),
            node.terminals.iter().join(", "),
            elements,
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}
