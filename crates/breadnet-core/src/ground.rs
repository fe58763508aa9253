//! Ground and power marker resolution.

use itertools::Itertools;
use log::debug;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::circuit::Circuit;
use crate::config::ResolveConfig;
use crate::labeler::{NodeIndex, NodeTable};
use crate::matcher::nearest_terminal;
use crate::model::{MarkerRef, Point};
use crate::terminal::{TerminalId, TerminalKey, Terminals};
use crate::warnings::{component_ref, terminal_ref, WarningCode, Warnings};

/// Node identifier as written into element cards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    /// The reference node, printed as `0`.
    Ground,
    Net(u32),
}

impl NodeId {
    pub fn number(self) -> u32 {
        match self {
            NodeId::Ground => 0,
            NodeId::Net(n) => n,
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.number())
    }
}

/// Final identifier of every labeled node.
#[derive(Debug, Clone, Default)]
pub struct ResolvedNodes {
    ids: Vec<NodeId>,
    ground: Option<NodeIndex>,
}

impl ResolvedNodes {
    /// Relabel `ground` to [`NodeId::Ground`] and close the gap it leaves,
    /// keeping the relative order of the other nodes.
    pub fn new(node_count: usize, ground: Option<NodeIndex>) -> Self {
        let ids = (0..node_count as u32)
            .map(|i| match ground {
                Some(g) if g.0 == i => NodeId::Ground,
                Some(g) if i < g.0 => NodeId::Net(i + 1),
                Some(_) => NodeId::Net(i),
                None => NodeId::Net(i + 1),
            })
            .collect();
        Self { ids, ground }
    }

    pub fn id(&self, node: NodeIndex) -> NodeId {
        self.ids[node.index()]
    }

    pub fn ground(&self) -> Option<NodeIndex> {
        self.ground
    }
}

/// A power marker and the node it landed on. Power markers never constrain
/// the topology; they are reported as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerNet {
    pub marker: MarkerRef,
    pub terminal: TerminalKey,
    pub node: NodeId,
}

#[derive(Debug, Clone)]
pub struct GroundResolution {
    pub nodes: ResolvedNodes,
    pub power: Vec<PowerNet>,
}

/// Ground markers landed on more than one node.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "ground markers resolve to {} disconnected nodes: {}",
    .groups.len(),
    describe_groups(.groups)
)]
pub struct AmbiguousGround {
    /// Grounded terminals per disjoint node, in node order.
    pub groups: Vec<Vec<TerminalKey>>,
}

impl AmbiguousGround {
    pub fn terminals(&self) -> impl Iterator<Item = &TerminalKey> {
        self.groups.iter().flatten()
    }
}

fn describe_groups(groups: &[Vec<TerminalKey>]) -> String {
    groups
        .iter()
        .map(|group| format!("{{{}}}", group.iter().join(", ")))
        .join(" vs ")
}

#[derive(Clone, Copy)]
enum Role {
    Ground,
    Power,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Ground => "ground",
            Role::Power => "power",
        }
    }
}

struct MarkerResolver<'a, 'c> {
    circuit: &'a Circuit<'c>,
    terminals: &'a Terminals,
    config: &'a ResolveConfig,
}

impl MarkerResolver<'_, '_> {
    /// Terminals named by `marker`, or an `InvalidMarker` warning and nothing.
    fn resolve(&self, marker: &MarkerRef, role: Role, warnings: &mut Warnings) -> Vec<TerminalId> {
        let rejected = |warnings: &mut Warnings, reason: String, related: Vec<String>| {
            warnings.push(
                WarningCode::InvalidMarker,
                format!("{} marker {marker} ignored: {reason}", role.as_str()),
                related,
            );
            Vec::<TerminalId>::new()
        };

        match *marker {
            MarkerRef::Terminal {
                component,
                terminal,
            } => {
                let key = TerminalKey::Real {
                    component,
                    index: terminal,
                };
                match self.terminals.get(&key) {
                    Some(id) => vec![id],
                    None => rejected(
                        warnings,
                        "no such terminal".to_string(),
                        vec![terminal_ref(key)],
                    ),
                }
            }
            MarkerRef::Component { component } => {
                let Some(found) = self.circuit.component(component) else {
                    return rejected(
                        warnings,
                        "no such component".to_string(),
                        vec![component_ref(component)],
                    );
                };
                let ids = self.terminals.of_component(found);
                match ids.len() {
                    0 => rejected(
                        warnings,
                        "component has no terminals".to_string(),
                        vec![component_ref(component)],
                    ),
                    1 => ids,
                    n if self.config.component_markers_cover_all_terminals => {
                        debug!(
                            "{} marker on component {component} covers {n} terminals",
                            role.as_str()
                        );
                        ids
                    }
                    n => rejected(
                        warnings,
                        format!(
                            "component has {n} terminals and component-level markers are not \
                             enabled; mark a terminal instead"
                        ),
                        vec![component_ref(component)],
                    ),
                }
            }
            MarkerRef::Position { x, y } => {
                let point = Point::new(x, y);
                match nearest_terminal(
                    self.terminals,
                    point,
                    self.config.match_tolerance_distance,
                ) {
                    Some(id) => vec![id],
                    None => rejected(
                        warnings,
                        format!(
                            "no terminal within {} of {point}",
                            self.config.match_tolerance_distance
                        ),
                        Vec::new(),
                    ),
                }
            }
        }
    }
}

/// Pick the ground node and assign final node identifiers.
///
/// All ground markers must land on one node. Markers on two or more
/// disconnected nodes are an [`AmbiguousGround`] error; nothing is guessed.
/// Without any usable ground marker node 0 becomes ground and a
/// `DefaultGround` note is recorded.
pub fn resolve_ground(
    circuit: &Circuit,
    terminals: &Terminals,
    table: &NodeTable,
    ground_markers: &[MarkerRef],
    power_markers: &[MarkerRef],
    config: &ResolveConfig,
    warnings: &mut Warnings,
) -> Result<GroundResolution, AmbiguousGround> {
    let resolver = MarkerResolver {
        circuit,
        terminals,
        config,
    };

    let grounded: Vec<TerminalId> = ground_markers
        .iter()
        .flat_map(|marker| resolver.resolve(marker, Role::Ground, warnings))
        .collect();
    // Power markers are bound now so their warnings precede `DefaultGround`.
    let powered: Vec<(&MarkerRef, TerminalId)> = power_markers
        .iter()
        .flat_map(|marker| {
            resolver
                .resolve(marker, Role::Power, warnings)
                .into_iter()
                .map(move |id| (marker, id))
        })
        .collect();

    let ground_nodes: Vec<NodeIndex> = grounded
        .iter()
        .map(|&id| table.node_of(id))
        .sorted()
        .dedup()
        .collect();

    let ground = match ground_nodes.as_slice() {
        [] if table.is_empty() => None,
        [] => {
            let first = table.members(NodeIndex(0))[0];
            let reason = if ground_markers.is_empty() {
                "no ground marker supplied"
            } else {
                "no ground marker could be resolved"
            };
            warnings.push(
                WarningCode::DefaultGround,
                format!(
                    "{reason}; using node 0 (contains terminal {}) as ground",
                    terminals.key(first)
                ),
                vec![terminal_ref(terminals.key(first))],
            );
            Some(NodeIndex(0))
        }
        [single] => Some(*single),
        several => {
            let groups = several
                .iter()
                .map(|&node| {
                    grounded
                        .iter()
                        .filter(|&&id| table.node_of(id) == node)
                        .map(|&id| terminals.key(id))
                        .sorted()
                        .dedup()
                        .collect()
                })
                .collect();
            return Err(AmbiguousGround { groups });
        }
    };

    let nodes = ResolvedNodes::new(table.len(), ground);

    let power = powered
        .into_iter()
        .map(|(marker, id)| PowerNet {
            marker: marker.clone(),
            terminal: terminals.key(id),
            node: nodes.id(table.node_of(id)),
        })
        .collect();

    debug!(
        "ground resolved to {:?} across {} nodes",
        ground,
        table.len()
    );
    Ok(GroundResolution { nodes, power })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_connectivity;
    use crate::labeler::label_nodes;
    use crate::matcher::match_endpoints;
    use crate::model::{Component, ComponentKind, Wire};

    struct Fixture {
        components: Vec<Component>,
        wires: Vec<Wire>,
    }

    impl Fixture {
        /// R1 (0,0)-(100,0), R2 (200,0)-(300,0), wire joining R1.1 and R2.0.
        fn two_resistors() -> Self {
            Self {
                components: vec![
                    Component::new(1, ComponentKind::Resistor, [(0.0, 0.0), (100.0, 0.0)]),
                    Component::new(2, ComponentKind::Resistor, [(200.0, 0.0), (300.0, 0.0)]),
                ],
                wires: vec![Wire::new(1, (100.0, 0.0), (200.0, 0.0))],
            }
        }

        fn run(
            &self,
            ground: &[MarkerRef],
            power: &[MarkerRef],
            config: &ResolveConfig,
        ) -> (Result<GroundResolution, AmbiguousGround>, Warnings, NodeTable, Terminals) {
            let mut warnings = Warnings::default();
            let circuit = Circuit::new(&self.components, &self.wires, &mut warnings);
            let matched = match_endpoints(&circuit, config.match_tolerance_distance, &mut warnings);
            let mut connectivity =
                build_connectivity(&circuit, &matched, config.coincidence_tolerance());
            let table = label_nodes(&matched.terminals, &mut connectivity);
            let result = resolve_ground(
                &circuit,
                &matched.terminals,
                &table,
                ground,
                power,
                config,
                &mut warnings,
            );
            (result, warnings, table, matched.terminals)
        }
    }

    fn node(table: &NodeTable, terminals: &Terminals, component: u32, index: usize) -> NodeIndex {
        table.node_of(
            terminals
                .get(&TerminalKey::Real { component, index })
                .unwrap(),
        )
    }

    #[test]
    fn test_renumbering_closes_gap() {
        let nodes = ResolvedNodes::new(4, Some(NodeIndex(2)));
        let ids: Vec<String> = (0..4).map(|i| nodes.id(NodeIndex(i)).to_string()).collect();
        assert_eq!(ids, ["1", "2", "0", "3"]);
    }

    #[test]
    fn test_ground_on_middle_node() {
        let fixture = Fixture::two_resistors();
        let (result, warnings, table, terminals) =
            fixture.run(&[MarkerRef::terminal(2, 0)], &[], &ResolveConfig::default());
        let resolution = result.unwrap();
        assert!(warnings.is_empty());

        let id = |c, i| resolution.nodes.id(node(&table, &terminals, c, i));
        assert_eq!(id(1, 0), NodeId::Net(1));
        assert_eq!(id(1, 1), NodeId::Ground);
        assert_eq!(id(2, 0), NodeId::Ground);
        assert_eq!(id(2, 1), NodeId::Net(2));
    }

    #[test]
    fn test_connected_markers_agree() {
        let fixture = Fixture::two_resistors();
        let (result, _, _, _) = fixture.run(
            &[MarkerRef::terminal(1, 1), MarkerRef::terminal(2, 0)],
            &[],
            &ResolveConfig::default(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_disjoint_markers_are_fatal() {
        let fixture = Fixture::two_resistors();
        let (result, _, _, _) = fixture.run(
            &[MarkerRef::terminal(1, 0), MarkerRef::terminal(2, 1)],
            &[],
            &ResolveConfig::default(),
        );
        let err = result.unwrap_err();
        assert_eq!(err.groups.len(), 2);
        assert_eq!(
            err.to_string(),
            "ground markers resolve to 2 disconnected nodes: {1.0} vs {2.1}"
        );
    }

    #[test]
    fn test_default_ground_when_unmarked() {
        let fixture = Fixture::two_resistors();
        let (result, warnings, table, terminals) =
            fixture.run(&[], &[], &ResolveConfig::default());
        let resolution = result.unwrap();
        assert_eq!(
            resolution.nodes.id(node(&table, &terminals, 1, 0)),
            NodeId::Ground
        );
        let codes: Vec<WarningCode> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, [WarningCode::DefaultGround]);
    }

    #[test]
    fn test_component_marker_scope() {
        let fixture = Fixture::two_resistors();

        let (result, warnings, _, _) =
            fixture.run(&[MarkerRef::component(1)], &[], &ResolveConfig::default());
        assert!(result.is_ok());
        let codes: Vec<WarningCode> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            [WarningCode::InvalidMarker, WarningCode::DefaultGround]
        );

        let config = ResolveConfig {
            component_markers_cover_all_terminals: true,
            ..ResolveConfig::default()
        };
        let (result, _, _, _) = fixture.run(&[MarkerRef::component(1)], &[], &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_position_marker_and_power() {
        let fixture = Fixture::two_resistors();
        let (result, warnings, _, _) = fixture.run(
            &[MarkerRef::Position { x: 2.0, y: 1.0 }],
            &[MarkerRef::terminal(2, 1), MarkerRef::terminal(5, 0)],
            &ResolveConfig::default(),
        );
        let resolution = result.unwrap();
        assert_eq!(
            resolution.power,
            vec![PowerNet {
                marker: MarkerRef::terminal(2, 1),
                terminal: TerminalKey::Real {
                    component: 2,
                    index: 1
                },
                node: NodeId::Net(2),
            }]
        );
        let codes: Vec<WarningCode> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, [WarningCode::InvalidMarker]);
    }
}
