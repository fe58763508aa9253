//! Breadboard topology resolution.
//!
//! Detected components and wires go through five stages, each a plain
//! function over request-local data:
//!
//! 1. [`match_endpoints`] binds wire endpoints to component terminals.
//! 2. [`build_connectivity`] merges terminals joined by wires or contact.
//! 3. [`label_nodes`] numbers the resulting sets deterministically.
//! 4. [`resolve_ground`] picks the reference node from the ground markers.
//! 5. [`emit_netlist`] writes one SPICE element card per component.
//!
//! [`resolve`] runs all of them. Only disagreeing ground markers are fatal;
//! every other problem is recorded as a [`Warning`] and resolution carries on.

use serde::Serialize;
use thiserror::Error;

pub mod circuit;
pub mod config;
pub mod detect;
pub mod emit;
pub mod graph;
pub mod ground;
pub mod labeler;
pub mod matcher;
pub mod model;
pub mod response;
pub mod terminal;
pub mod value;
pub mod warnings;

// Re-export commonly used types
pub use circuit::Circuit;
pub use config::{ConfigError, ResolveConfig};
pub use detect::{Detections, Detector, Pipeline};
pub use emit::{emit_netlist, ComponentReport, ComponentStatus, Element, Netlist};
pub use graph::{build_connectivity, Connectivity};
pub use ground::{resolve_ground, AmbiguousGround, NodeId, PowerNet};
pub use labeler::{label_nodes, NodeIndex, NodeTable};
pub use matcher::{match_endpoints, nearest_terminal};
pub use model::{
    BoundingBox, CircuitInput, Component, ComponentId, ComponentKind, MarkerRef, Point, Wire,
    WireId,
};
pub use response::ResolveResponse;
pub use terminal::{TerminalKey, WireSide};
pub use warnings::{Severity, Warning, WarningCode, Warnings};

/// One electrical node and the terminals it joins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedNode {
    pub id: NodeId,
    /// Sorted by key; junctions last.
    pub terminals: Vec<TerminalKey>,
}

/// Successful outcome of [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub netlist: Netlist,
    /// Ground first, then `1..n`.
    pub nodes: Vec<ResolvedNode>,
    pub power: Vec<PowerNet>,
    pub components: Vec<ComponentReport>,
    pub warnings: Vec<Warning>,
}

impl Resolution {
    pub fn netlist_text(&self) -> String {
        self.netlist.to_string()
    }

    pub fn node_of(&self, key: TerminalKey) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.terminals.contains(&key))
            .map(|node| node.id)
    }

    pub fn ground(&self) -> Option<&ResolvedNode> {
        self.nodes.iter().find(|node| node.id == NodeId::Ground)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("{source}")]
    AmbiguousGround {
        source: AmbiguousGround,
        /// Everything recorded up to and including the fatal entry.
        warnings: Vec<Warning>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl ResolveError {
    pub fn warnings(&self) -> Vec<Warning> {
        match self {
            ResolveError::AmbiguousGround { warnings, .. } => warnings.clone(),
            ResolveError::InvalidConfig(err) => vec![Warning::new(
                WarningCode::InvalidConfig,
                err.to_string(),
                Vec::new(),
            )],
        }
    }
}

/// Resolve detections into a netlist.
///
/// Pure and synchronous: every call works on its own terminal arena and
/// union-find, so independent callers may run it concurrently.
pub fn resolve(
    components: &[Component],
    wires: &[Wire],
    ground_markers: &[MarkerRef],
    power_markers: &[MarkerRef],
    config: &ResolveConfig,
) -> Result<Resolution, ResolveError> {
    config.validate()?;
    let mut warnings = Warnings::default();

    let circuit = Circuit::new(components, wires, &mut warnings);
    let matched = match_endpoints(&circuit, config.match_tolerance_distance, &mut warnings);
    let mut connectivity = build_connectivity(&circuit, &matched, config.coincidence_tolerance());
    let table = label_nodes(&matched.terminals, &mut connectivity);

    let ground = match resolve_ground(
        &circuit,
        &matched.terminals,
        &table,
        ground_markers,
        power_markers,
        config,
        &mut warnings,
    ) {
        Ok(ground) => ground,
        Err(source) => {
            warnings.push(
                WarningCode::AmbiguousGroundError,
                source.to_string(),
                source
                    .terminals()
                    .map(|&key| crate::warnings::terminal_ref(key))
                    .collect(),
            );
            return Err(ResolveError::AmbiguousGround {
                source,
                warnings: warnings.into_vec(),
            });
        }
    };

    let emission = emit_netlist(
        &circuit,
        &matched.terminals,
        &table,
        &ground.nodes,
        config,
        &mut warnings,
    );

    let mut nodes: Vec<ResolvedNode> = table
        .iter()
        .map(|(index, members)| ResolvedNode {
            id: ground.nodes.id(index),
            terminals: members
                .iter()
                .map(|&id| matched.terminals.key(id))
                .collect(),
        })
        .collect();
    nodes.sort_by_key(|node| node.id);

    Ok(Resolution {
        netlist: emission.netlist,
        nodes,
        power: ground.power,
        components: emission.reports,
        warnings: warnings.into_vec(),
    })
}

impl CircuitInput {
    /// Resolve with the request's own `config`, falling back to `default`.
    pub fn resolve(&self, default: &ResolveConfig) -> Result<Resolution, ResolveError> {
        let config = self.config.as_ref().unwrap_or(default);
        resolve(
            &self.components,
            &self.wires,
            &self.ground_markers,
            &self.power_markers,
            config,
        )
    }
}
