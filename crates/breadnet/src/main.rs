use clap::{Parser, Subcommand};

mod input;
mod netlist;
mod nodes;

#[derive(Parser)]
#[command(name = "breadnet")]
#[command(about = "Resolve breadboard detections into SPICE netlists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the SPICE netlist for a detection document
    #[command(alias = "n")]
    Netlist(netlist::NetlistArgs),

    /// List resolved nodes and their terminals
    Nodes(nodes::NodesArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Netlist(args) => netlist::execute(args),
        Commands::Nodes(args) => nodes::execute(args),
    }
}
