//! Endpoint matching: bind each wire endpoint to a component terminal.

use log::debug;

use crate::circuit::Circuit;
use crate::model::{Point, WireId};
use crate::terminal::{TerminalId, Terminals, WireSide};
use crate::warnings::{wire_ref, WarningCode, Warnings};

/// The two terminals a wire joins, side A first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireBinding {
    pub wire: WireId,
    pub ends: [TerminalId; 2],
}

#[derive(Debug, Clone)]
pub struct Matched {
    pub terminals: Terminals,
    pub bindings: Vec<WireBinding>,
}

/// Nearest component terminal to `point` within `tolerance`.
///
/// Equal distances go to the lowest component id, then the lowest terminal
/// index. Junctions are never candidates.
pub fn nearest_terminal(terminals: &Terminals, point: Point, tolerance: f64) -> Option<TerminalId> {
    if !point.is_finite() {
        return None;
    }
    terminals
        .real()
        .filter_map(|id| {
            let distance = terminals.position(id).distance(&point);
            (distance <= tolerance).then_some((distance, id))
        })
        .min_by(|(da, a), (db, b)| {
            da.total_cmp(db)
                .then_with(|| terminals.key(*a).cmp(&terminals.key(*b)))
        })
        .map(|(_, id)| id)
}

/// Build the terminal universe and bind every wire endpoint into it.
/// Unmatched endpoints become junction terminals and are reported as
/// `MatchingError`.
pub fn match_endpoints(circuit: &Circuit, tolerance: f64, warnings: &mut Warnings) -> Matched {
    let mut terminals = Terminals::from_components(circuit.components().iter().copied());
    let mut bindings = Vec::with_capacity(circuit.wires().len());

    for wire in circuit.wires() {
        let ends = WireSide::BOTH.map(|side| {
            let endpoint = wire.endpoint(side);
            if let Some(id) = nearest_terminal(&terminals, endpoint, tolerance) {
                return id;
            }
            warnings.push(
                WarningCode::MatchingError,
                format!(
                    "wire {} endpoint {} at {endpoint} has no terminal within {tolerance}",
                    wire.id,
                    side.as_str().to_uppercase(),
                ),
                vec![wire_ref(wire.id)],
            );
            terminals.junction(wire.id, side, endpoint)
        });
        bindings.push(WireBinding {
            wire: wire.id,
            ends,
        });
    }

    debug!(
        "matched {} wires onto {} terminals ({} junctions)",
        bindings.len(),
        terminals.len(),
        terminals.len() - terminals.real().count()
    );

    Matched {
        terminals,
        bindings,
    }
}
