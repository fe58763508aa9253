use std::collections::{HashMap, HashSet};

use crate::model::{Component, ComponentId, Wire};
use crate::warnings::{component_ref, wire_ref, WarningCode, Warnings};

/// Request view with duplicate ids removed. First occurrence wins; input
/// order is otherwise preserved.
#[derive(Debug, Clone)]
pub struct Circuit<'a> {
    components: Vec<&'a Component>,
    wires: Vec<&'a Wire>,
    by_id: HashMap<ComponentId, &'a Component>,
}

impl<'a> Circuit<'a> {
    pub fn new(components: &'a [Component], wires: &'a [Wire], warnings: &mut Warnings) -> Self {
        let mut by_id = HashMap::with_capacity(components.len());
        let mut kept = Vec::with_capacity(components.len());
        for component in components {
            if by_id.contains_key(&component.id) {
                warnings.push(
                    WarningCode::DuplicateId,
                    format!(
                        "component id {} appears more than once; later occurrence ignored",
                        component.id
                    ),
                    vec![component_ref(component.id)],
                );
                continue;
            }
            by_id.insert(component.id, component);
            kept.push(component);
        }

        let mut seen_wires = HashSet::with_capacity(wires.len());
        let mut kept_wires = Vec::with_capacity(wires.len());
        for wire in wires {
            if !seen_wires.insert(wire.id) {
                warnings.push(
                    WarningCode::DuplicateId,
                    format!(
                        "wire id {} appears more than once; later occurrence ignored",
                        wire.id
                    ),
                    vec![wire_ref(wire.id)],
                );
                continue;
            }
            kept_wires.push(wire);
        }

        Self {
            components: kept,
            wires: kept_wires,
            by_id,
        }
    }

    pub fn components(&self) -> &[&'a Component] {
        &self.components
    }

    pub fn wires(&self) -> &[&'a Wire] {
        &self.wires
    }

    pub fn component(&self, id: ComponentId) -> Option<&'a Component> {
        self.by_id.get(&id).copied()
    }
}
