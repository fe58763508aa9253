pub mod union_find;

use itertools::Itertools;
use log::debug;

use crate::circuit::Circuit;
use crate::matcher::Matched;
use crate::model::ComponentKind;
use crate::terminal::{TerminalId, Terminals};
use union_find::UnionFind;

/// Electrical connectivity over the terminal universe of one request.
#[derive(Debug, Clone)]
pub struct Connectivity {
    sets: UnionFind,
}

impl Connectivity {
    pub fn new(terminal_count: usize) -> Self {
        Self {
            sets: UnionFind::new(terminal_count),
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Representative of the set holding `id`. Only meaningful for grouping;
    /// it carries no ordering guarantee.
    pub fn root(&mut self, id: TerminalId) -> usize {
        self.sets.find(id.index())
    }

    pub fn join(&mut self, a: TerminalId, b: TerminalId) -> bool {
        self.sets.union(a.index(), b.index())
    }

    pub fn connected(&mut self, a: TerminalId, b: TerminalId) -> bool {
        self.sets.same(a.index(), b.index())
    }
}

/// Merge terminals joined by a wire, by a `Wire`-kind component, or by
/// physical contact (positions within `coincidence_tolerance`, junctions
/// included). Nothing else is inferred.
pub fn build_connectivity(
    circuit: &Circuit,
    matched: &Matched,
    coincidence_tolerance: f64,
) -> Connectivity {
    let terminals = &matched.terminals;
    let mut connectivity = Connectivity::new(terminals.len());

    for binding in &matched.bindings {
        let [a, b] = binding.ends;
        connectivity.join(a, b);
    }

    for component in circuit
        .components()
        .iter()
        .filter(|c| c.kind == ComponentKind::Wire)
    {
        for (a, b) in terminals
            .of_component(component)
            .into_iter()
            .tuple_windows()
        {
            connectivity.join(a, b);
        }
    }

    let contacts = join_coincident(terminals, coincidence_tolerance, &mut connectivity);

    debug!(
        "connectivity: {} wires, {} contact merges over {} terminals",
        matched.bindings.len(),
        contacts,
        terminals.len()
    );
    connectivity
}

/// Sweep over all terminals sorted by x, joining every pair within
/// `tolerance`. Junctions take part, so wires whose loose ends meet at an
/// empty point conduct. Returns the number of merges that changed the
/// partition.
fn join_coincident(
    terminals: &Terminals,
    tolerance: f64,
    connectivity: &mut Connectivity,
) -> usize {
    let sorted: Vec<TerminalId> = terminals
        .ids()
        .filter(|&id| terminals.position(id).is_finite())
        .sorted_by(|&a, &b| {
            terminals
                .position(a)
                .x
                .total_cmp(&terminals.position(b).x)
                .then_with(|| terminals.key(a).cmp(&terminals.key(b)))
        })
        .collect();

    let mut merges = 0;
    for (i, &a) in sorted.iter().enumerate() {
        let pa = terminals.position(a);
        for &b in &sorted[i + 1..] {
            let pb = terminals.position(b);
            if pb.x - pa.x > tolerance {
                break;
            }
            if pa.distance(&pb) <= tolerance && connectivity.join(a, b) {
                merges += 1;
            }
        }
    }
    merges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_endpoints;
    use crate::model::{Component, Wire};
    use crate::terminal::TerminalKey;
    use crate::warnings::Warnings;

    fn id(terminals: &Terminals, component: u32, index: usize) -> TerminalId {
        terminals
            .get(&TerminalKey::Real { component, index })
            .unwrap()
    }

    #[test]
    fn test_wires_and_contacts_merge() {
        let components = vec![
            Component::new(1, ComponentKind::Resistor, [(0.0, 0.0), (100.0, 0.0)]),
            Component::new(2, ComponentKind::Resistor, [(200.0, 0.0), (300.0, 0.0)]),
            // Lead touching R2's second terminal without a wire.
            Component::new(3, ComponentKind::Capacitor, [(302.0, 1.0), (400.0, 0.0)]),
        ];
        let wires = vec![Wire::new(1, (100.0, 0.0), (200.0, 0.0))];
        let mut warnings = Warnings::default();
        let circuit = Circuit::new(&components, &wires, &mut warnings);
        let matched = match_endpoints(&circuit, 10.0, &mut warnings);
        let mut graph = build_connectivity(&circuit, &matched, 5.0);
        let t = &matched.terminals;

        assert!(graph.connected(id(t, 1, 1), id(t, 2, 0)));
        assert!(graph.connected(id(t, 2, 1), id(t, 3, 0)));
        assert!(!graph.connected(id(t, 1, 0), id(t, 1, 1)));
        assert!(!graph.connected(id(t, 3, 1), id(t, 2, 1)));
    }

    #[test]
    fn test_contact_needs_both_axes_close() {
        let components = vec![
            Component::new(1, ComponentKind::Resistor, [(0.0, 0.0)]),
            Component::new(2, ComponentKind::Resistor, [(0.0, 50.0)]),
            Component::new(3, ComponentKind::Resistor, [(3.0, 3.0)]),
        ];
        let mut warnings = Warnings::default();
        let circuit = Circuit::new(&components, &[], &mut warnings);
        let matched = match_endpoints(&circuit, 10.0, &mut warnings);
        let mut graph = build_connectivity(&circuit, &matched, 5.0);
        let t = &matched.terminals;

        assert!(!graph.connected(id(t, 1, 0), id(t, 2, 0)));
        assert!(graph.connected(id(t, 1, 0), id(t, 3, 0)));
    }

    #[test]
    fn test_wire_components_conduct() {
        let components = vec![
            Component::new(
                1,
                ComponentKind::Wire,
                [(0.0, 0.0), (500.0, 0.0), (0.0, 500.0)],
            ),
            Component::new(2, ComponentKind::Resistor, [(0.0, 0.0), (50.0, 50.0)]),
        ];
        let mut warnings = Warnings::default();
        let circuit = Circuit::new(&components, &[], &mut warnings);
        let matched = match_endpoints(&circuit, 10.0, &mut warnings);
        let mut graph = build_connectivity(&circuit, &matched, 1.0);
        let t = &matched.terminals;

        assert!(graph.connected(id(t, 1, 0), id(t, 1, 2)));
        assert!(graph.connected(id(t, 1, 1), id(t, 2, 0)));
        assert!(!graph.connected(id(t, 2, 1), id(t, 2, 0)));
    }

    #[test]
    fn test_zero_tolerance_only_exact_contacts() {
        let components = vec![
            Component::new(1, ComponentKind::Resistor, [(1.0, 1.0)]),
            Component::new(2, ComponentKind::Resistor, [(1.0, 1.0)]),
            Component::new(3, ComponentKind::Resistor, [(1.0, 1.000001)]),
        ];
        let mut warnings = Warnings::default();
        let circuit = Circuit::new(&components, &[], &mut warnings);
        let matched = match_endpoints(&circuit, 0.0, &mut warnings);
        let mut graph = build_connectivity(&circuit, &matched, 0.0);
        let t = &matched.terminals;

        assert!(graph.connected(id(t, 1, 0), id(t, 2, 0)));
        assert!(!graph.connected(id(t, 1, 0), id(t, 3, 0)));
    }

    #[test]
    fn test_loose_wire_ends_meeting_conduct() {
        let components = vec![
            Component::new(1, ComponentKind::Resistor, [(0.0, 0.0), (100.0, 0.0)]),
            Component::new(2, ComponentKind::Resistor, [(400.0, 0.0), (500.0, 0.0)]),
        ];
        let wires = vec![
            Wire::new(1, (100.0, 0.0), (250.0, 0.0)),
            Wire::new(2, (251.0, 0.0), (400.0, 0.0)),
            // Loose end within coincidence range of R2's far lead.
            Wire::new(3, (0.0, 0.0), (520.0, 0.0)),
        ];
        let mut warnings = Warnings::default();
        let circuit = Circuit::new(&components, &wires, &mut warnings);
        let matched = match_endpoints(&circuit, 10.0, &mut warnings);
        assert_eq!(warnings.len(), 3);

        let mut graph = build_connectivity(&circuit, &matched, 2.0);
        let t = &matched.terminals;
        assert!(graph.connected(id(t, 1, 1), id(t, 2, 0)));
        assert!(!graph.connected(id(t, 1, 0), id(t, 2, 1)));

        let mut graph = build_connectivity(&circuit, &matched, 25.0);
        assert!(graph.connected(id(t, 1, 0), id(t, 2, 1)));
    }
}
