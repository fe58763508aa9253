//! SPICE netlist emission.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::RangeInclusive;

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::circuit::Circuit;
use crate::config::ResolveConfig;
use crate::ground::{NodeId, ResolvedNodes};
use crate::labeler::NodeTable;
use crate::model::{Component, ComponentId, ComponentKind};
use crate::terminal::{TerminalKey, Terminals};
use crate::value::ValueKind;
use crate::warnings::{component_ref, WarningCode, Warnings};

/// One element card: `<name> <node>... <value>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub component: ComponentId,
    pub name: String,
    pub nodes: Vec<NodeId>,
    pub value: String,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for node in &self.nodes {
            write!(f, " {node}")?;
        }
        write!(f, " {}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Netlist {
    pub title: Option<String>,
    /// In ascending component id order.
    pub elements: Vec<Element>,
    pub end_card: bool,
}

impl Netlist {
    pub fn element(&self, component: ComponentId) -> Option<&Element> {
        self.elements.iter().find(|e| e.component == component)
    }
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, "* {}", title.lines().join(" "))?;
        }
        for element in &self.elements {
            writeln!(f, "{element}")?;
        }
        if self.end_card {
            writeln!(f, ".end")?;
        }
        Ok(())
    }
}

/// What happened to a component during emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ComponentStatus {
    Emitted { name: String },
    /// No terminal shares a node with another part.
    Isolated,
    /// No element card exists for the kind.
    Unsupported,
    /// Jumper: contributes connectivity only.
    ConnectivityOnly,
    /// Lead count does not fit the element card.
    InvalidTerminals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReport {
    pub id: ComponentId,
    pub kind: ComponentKind,
    #[serde(flatten)]
    pub status: ComponentStatus,
}

#[derive(Debug, Clone, Default)]
pub struct Emission {
    pub netlist: Netlist,
    pub reports: Vec<ComponentReport>,
}

struct Pending<'a> {
    component: &'a Component,
    prefix: char,
    nodes: Vec<NodeId>,
    value: String,
}

/// Leads an element card takes. `None` for subcircuit calls, which take any.
fn lead_count(prefix: char) -> Option<RangeInclusive<usize>> {
    match prefix {
        'R' | 'C' | 'L' | 'V' | 'D' => Some(2..=2),
        'Q' => Some(3..=4),
        _ => None,
    }
}

fn describe_range(range: &RangeInclusive<usize>) -> String {
    if range.start() == range.end() {
        range.start().to_string()
    } else {
        format!("{} to {}", range.start(), range.end())
    }
}

/// Map every component onto an element card, or report why it has none.
pub fn emit_netlist(
    circuit: &Circuit,
    terminals: &Terminals,
    table: &NodeTable,
    nodes: &ResolvedNodes,
    config: &ResolveConfig,
    warnings: &mut Warnings,
) -> Emission {
    let mut pending = Vec::new();
    let mut reports = Vec::with_capacity(circuit.components().len());

    for component in circuit.components().iter().copied().sorted_by_key(|c| c.id) {
        let report = |status: ComponentStatus| ComponentReport {
            id: component.id,
            kind: component.kind,
            status,
        };

        if component.kind == ComponentKind::Wire {
            reports.push(report(ComponentStatus::ConnectivityOnly));
            continue;
        }

        let Some(prefix) = component.kind.spice_prefix() else {
            warnings.push(
                WarningCode::UnsupportedComponentType,
                format!(
                    "component {} of type {} has no SPICE element; omitted",
                    component.id, component.kind
                ),
                vec![component_ref(component.id)],
            );
            reports.push(report(ComponentStatus::Unsupported));
            continue;
        };

        let leads = component.terminals.len();
        if let Some(expected) = lead_count(prefix).filter(|range| !range.contains(&leads)) {
            warnings.push(
                WarningCode::TerminalCountError,
                format!(
                    "component {} of type {} has {leads} terminals, expected {}; omitted",
                    component.id,
                    component.kind,
                    describe_range(&expected)
                ),
                vec![component_ref(component.id)],
            );
            reports.push(report(ComponentStatus::InvalidTerminals));
            continue;
        }

        if !is_connected(circuit, terminals, table, component) {
            warnings.push(
                WarningCode::IsolatedComponentWarning,
                format!(
                    "component {} has no connection to any other component; omitted",
                    component.id
                ),
                vec![component_ref(component.id)],
            );
            reports.push(report(ComponentStatus::Isolated));
            continue;
        }

        let kind = ValueKind::for_prefix(prefix);
        // Surrounding whitespace is not part of the value.
        let raw = component.value.trim();
        let value = if kind.accepts(raw) {
            raw.to_string()
        } else {
            let placeholder = match kind {
                ValueKind::Model => &config.placeholder_model,
                ValueKind::Number | ValueKind::Source => &config.placeholder_value,
            };
            warnings.push(
                WarningCode::ValueFormatError,
                format!(
                    "component {} value {:?} is not a valid {} value; using {placeholder}",
                    component.id,
                    component.value,
                    component.kind
                ),
                vec![component_ref(component.id)],
            );
            placeholder.clone()
        };

        let element_nodes = terminals
            .of_component(component)
            .into_iter()
            .map(|id| nodes.id(table.node_of(id)))
            .collect();

        pending.push(Pending {
            component,
            prefix,
            nodes: element_nodes,
            value,
        });
        // Placeholder; the name is filled in once all explicit names are known.
        reports.push(report(ComponentStatus::Emitted {
            name: String::new(),
        }));
    }

    let names = assign_names(&pending);
    let elements: Vec<Element> = pending
        .into_iter()
        .zip(names)
        .map(|(p, name)| Element {
            component: p.component.id,
            name,
            nodes: p.nodes,
            value: p.value,
        })
        .collect();

    for report in &mut reports {
        if let ComponentStatus::Emitted { name } = &mut report.status {
            if let Some(element) = elements.iter().find(|e| e.component == report.id) {
                name.clone_from(&element.name);
            }
        }
    }

    debug!(
        "emitted {} of {} components",
        elements.len(),
        reports.len()
    );

    Emission {
        netlist: Netlist {
            title: config.title.clone(),
            elements,
            end_card: config.end_card,
        },
        reports,
    }
}

/// True if some node holding one of the component's terminals also holds a
/// lead of a different, non-jumper component.
fn is_connected(
    circuit: &Circuit,
    terminals: &Terminals,
    table: &NodeTable,
    component: &Component,
) -> bool {
    terminals.of_component(component).into_iter().any(|id| {
        table
            .members(table.node_of(id))
            .iter()
            .any(|&member| match terminals.key(member) {
                TerminalKey::Real { component: other, .. } if other != component.id => circuit
                    .component(other)
                    .is_some_and(|c| c.kind != ComponentKind::Wire),
                _ => false,
            })
    })
}

/// Explicit names first, then per-prefix numbering in id order around them.
/// SPICE names are case-insensitive, so uniqueness is checked uppercased.
fn assign_names(pending: &[Pending]) -> Vec<String> {
    let mut taken = HashSet::new();

    let explicit: Vec<Option<String>> = pending
        .iter()
        .map(|p| {
            let name = p.component.name.as_deref()?.split_whitespace().join("_");
            let mut chars = name.chars();
            let starts_with_prefix = chars
                .next()
                .is_some_and(|c| c.eq_ignore_ascii_case(&p.prefix));
            if !starts_with_prefix || chars.next().is_none() {
                return None;
            }
            if taken.insert(name.to_ascii_uppercase()) {
                Some(name)
            } else {
                debug!(
                    "name {name} of component {} already taken; numbering instead",
                    p.component.id
                );
                None
            }
        })
        .collect();

    let mut counters: HashMap<char, u32> = HashMap::new();
    pending
        .iter()
        .zip(explicit)
        .map(|(p, name)| {
            name.unwrap_or_else(|| {
                let counter = counters.entry(p.prefix).or_insert(0);
                loop {
                    *counter += 1;
                    let candidate = format!("{}{}", p.prefix, counter);
                    if taken.insert(candidate.to_ascii_uppercase()) {
                        break candidate;
                    }
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_connectivity;
    use crate::ground::resolve_ground;
    use crate::labeler::label_nodes;
    use crate::matcher::match_endpoints;
    use crate::model::{MarkerRef, Wire};

    fn emit(
        components: &[Component],
        wires: &[Wire],
        config: &ResolveConfig,
    ) -> (Emission, Warnings) {
        let mut warnings = Warnings::default();
        let circuit = Circuit::new(components, wires, &mut warnings);
        let matched = match_endpoints(&circuit, config.match_tolerance_distance, &mut warnings);
        let mut connectivity =
            build_connectivity(&circuit, &matched, config.coincidence_tolerance());
        let table = label_nodes(&matched.terminals, &mut connectivity);
        let ground = resolve_ground(
            &circuit,
            &matched.terminals,
            &table,
            &[MarkerRef::terminal(1, 0)],
            &[],
            config,
            &mut warnings,
        )
        .unwrap();
        let emission = emit_netlist(
            &circuit,
            &matched.terminals,
            &table,
            &ground.nodes,
            config,
            &mut warnings,
        );
        (emission, warnings)
    }

    /// Resistor, LED and capacitor in a ring.
    fn ring() -> (Vec<Component>, Vec<Wire>) {
        let components = vec![
            Component::new(1, ComponentKind::Resistor, [(0.0, 0.0), (100.0, 0.0)])
                .with_value("4.7k"),
            Component::new(2, ComponentKind::Led, [(200.0, 0.0), (300.0, 0.0)])
                .with_value("LED_RED"),
            Component::new(3, ComponentKind::Capacitor, [(300.0, 100.0), (0.0, 100.0)])
                .with_value("banana"),
        ];
        let wires = vec![
            Wire::new(1, (100.0, 0.0), (200.0, 0.0)),
            Wire::new(2, (300.0, 0.0), (300.0, 100.0)),
            Wire::new(3, (0.0, 100.0), (0.0, 0.0)),
        ];
        (components, wires)
    }

    #[test]
    fn test_ring_netlist_text() {
        let (components, wires) = ring();
        let config = ResolveConfig::default().with_title("ring");
        let (emission, warnings) = emit(&components, &wires, &config);

        assert_eq!(
            emission.netlist.to_string(),
            "* ring\nR1 0 1 4.7k\nD1 1 2 LED_RED\nC1 2 0 1\n.end\n"
        );
        let codes: Vec<WarningCode> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, [WarningCode::ValueFormatError]);
    }

    #[test]
    fn test_reports_cover_every_component() {
        let (mut components, wires) = ring();
        components.push(Component::new(9, ComponentKind::Other, [(2000.0, 2000.0)]));
        components.push(Component::new(7, ComponentKind::Wire, [(500.0, 500.0), (600.0, 500.0)]));
        components.push(
            Component::new(5, ComponentKind::Resistor, [(900.0, 900.0), (1000.0, 900.0)])
                .with_value("1k"),
        );
        let (emission, warnings) = emit(&components, &wires, &ResolveConfig::default());

        let statuses: Vec<(ComponentId, ComponentStatus)> = emission
            .reports
            .iter()
            .map(|r| (r.id, r.status.clone()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (1, ComponentStatus::Emitted { name: "R1".into() }),
                (2, ComponentStatus::Emitted { name: "D1".into() }),
                (3, ComponentStatus::Emitted { name: "C1".into() }),
                (5, ComponentStatus::Isolated),
                (7, ComponentStatus::ConnectivityOnly),
                (9, ComponentStatus::Unsupported),
            ]
        );
        let codes: Vec<WarningCode> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            [
                WarningCode::ValueFormatError,
                WarningCode::IsolatedComponentWarning,
                WarningCode::UnsupportedComponentType,
            ]
        );
    }

    #[test]
    fn test_jumper_does_not_count_as_a_neighbour() {
        let components = vec![
            Component::new(1, ComponentKind::Resistor, [(0.0, 0.0), (100.0, 0.0)]).with_value("1k"),
            Component::new(2, ComponentKind::Wire, [(100.0, 0.0), (100.0, 300.0)]),
        ];
        let (emission, warnings) = emit(&components, &[], &ResolveConfig::default());
        assert!(emission.netlist.elements.is_empty());
        assert_eq!(
            warnings.iter().map(|w| w.code).collect::<Vec<_>>(),
            [WarningCode::IsolatedComponentWarning]
        );
    }

    #[test]
    fn test_explicit_names_and_numbering() {
        let (mut components, wires) = ring();
        components[0] = components[0].clone().with_name("R load");
        components[2] = components[2].clone().with_name("bad").with_value("10uF");
        components.push(
            Component::new(4, ComponentKind::Resistor, [(0.0, 0.0), (300.0, 0.0)])
                .with_value("1k")
                .with_name("r1"),
        );
        let config = ResolveConfig::default().with_end_card(false);
        let (emission, _) = emit(&components, &wires, &config);

        let names: Vec<&str> = emission
            .netlist
            .elements
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["R_load", "D1", "C1", "r1"]);
        assert!(!emission.netlist.to_string().contains(".end"));
    }

    #[test]
    fn test_numbering_skips_taken_names() {
        let components = vec![
            Component::new(1, ComponentKind::Resistor, [(0.0, 0.0), (100.0, 0.0)]).with_value("1k"),
            Component::new(2, ComponentKind::Resistor, [(100.0, 0.0), (200.0, 0.0)])
                .with_value("1k")
                .with_name("R1"),
        ];
        let (emission, _) = emit(&components, &[], &ResolveConfig::default());
        let names: Vec<&str> = emission
            .netlist
            .elements
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["R2", "R1"]);
    }

    #[test]
    fn test_lead_count_mismatch_omits_card() {
        let (mut components, wires) = ring();
        components.push(Component::new(4, ComponentKind::Resistor, [(0.0, 0.0)]).with_value("1k"));
        components.push(
            Component::new(6, ComponentKind::Transistor, [(100.0, 0.0), (200.0, 0.0)])
                .with_value("2N3904"),
        );
        let (emission, warnings) = emit(&components, &wires, &ResolveConfig::default());

        assert_eq!(emission.netlist.elements.len(), 3);
        assert_eq!(emission.reports[3].status, ComponentStatus::InvalidTerminals);
        assert_eq!(emission.reports[4].status, ComponentStatus::InvalidTerminals);
        let codes: Vec<WarningCode> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            [
                WarningCode::ValueFormatError,
                WarningCode::TerminalCountError,
                WarningCode::TerminalCountError,
            ]
        );
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages[1].contains("has 1 terminals, expected 2"));
        assert!(messages[2].contains("has 2 terminals, expected 3 to 4"));
    }

    #[test]
    fn test_accepted_value_is_trimmed() {
        let (mut components, wires) = ring();
        components[0] = components[0].clone().with_value("  4.7k ");
        let (emission, _) = emit(&components, &wires, &ResolveConfig::default());
        assert_eq!(
            emission.netlist.element(1).map(|e| e.value.as_str()),
            Some("4.7k")
        );
    }

    #[test]
    fn test_report_json() {
        let report = ComponentReport {
            id: 4,
            kind: ComponentKind::Diode,
            status: ComponentStatus::Emitted { name: "D1".into() },
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({"id": 4, "kind": "diode", "status": "emitted", "name": "D1"})
        );
    }
}
