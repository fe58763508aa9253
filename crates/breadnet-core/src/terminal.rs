use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Component, ComponentId, Point, WireId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireSide {
    A,
    B,
}

impl WireSide {
    pub const BOTH: [WireSide; 2] = [WireSide::A, WireSide::B];

    pub const fn as_str(self) -> &'static str {
        match self {
            WireSide::A => "a",
            WireSide::B => "b",
        }
    }
}

/// Stable identity of a terminal, independent of arena order.
///
/// The derived ordering puts every real terminal before every junction, and
/// orders real terminals by (component id, terminal index). Node numbering is
/// defined in terms of this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TerminalKey {
    Real { component: ComponentId, index: usize },
    /// Wire endpoint that matched nothing.
    Junction { wire: WireId, side: WireSide },
}

impl TerminalKey {
    pub fn component(&self) -> Option<ComponentId> {
        match self {
            TerminalKey::Real { component, .. } => Some(*component),
            TerminalKey::Junction { .. } => None,
        }
    }

    pub fn is_junction(&self) -> bool {
        matches!(self, TerminalKey::Junction { .. })
    }
}

impl std::fmt::Display for TerminalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalKey::Real { component, index } => write!(f, "{component}.{index}"),
            TerminalKey::Junction { wire, side } => write!(f, "w{wire}.{}", side.as_str()),
        }
    }
}

impl Serialize for TerminalKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

// Dense IDs. Keep them opaque.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TerminalId(pub(crate) u32);

impl TerminalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena of every terminal taking part in one resolution: component leads in
/// input order, followed by junctions in the order the matcher created them.
#[derive(Debug, Clone, Default)]
pub struct Terminals {
    keys: Vec<TerminalKey>,
    positions: Vec<Point>,
    by_key: HashMap<TerminalKey, TerminalId>,
}

impl Terminals {
    pub fn from_components<'a>(components: impl IntoIterator<Item = &'a Component>) -> Self {
        let mut terminals = Self::default();
        for component in components {
            for (index, position) in component.terminals.iter().enumerate() {
                terminals.insert(
                    TerminalKey::Real {
                        component: component.id,
                        index,
                    },
                    *position,
                );
            }
        }
        terminals
    }

    /// Add a terminal, or return the existing id if the key is already present.
    pub(crate) fn insert(&mut self, key: TerminalKey, position: Point) -> TerminalId {
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = TerminalId(self.keys.len() as u32);
        self.keys.push(key);
        self.positions.push(position);
        self.by_key.insert(key, id);
        id
    }

    pub fn junction(&mut self, wire: WireId, side: WireSide, position: Point) -> TerminalId {
        self.insert(TerminalKey::Junction { wire, side }, position)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, id: TerminalId) -> TerminalKey {
        self.keys[id.index()]
    }

    pub fn position(&self, id: TerminalId) -> Point {
        self.positions[id.index()]
    }

    pub fn get(&self, key: &TerminalKey) -> Option<TerminalId> {
        self.by_key.get(key).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = TerminalId> {
        (0..self.keys.len() as u32).map(TerminalId)
    }

    /// Component leads only, in arena order.
    pub fn real(&self) -> impl Iterator<Item = TerminalId> + '_ {
        self.ids().filter(|&id| !self.key(id).is_junction())
    }

    /// Arena ids of one component's terminals, in terminal index order.
    pub fn of_component(&self, component: &Component) -> Vec<TerminalId> {
        (0..component.terminals.len())
            .filter_map(|index| {
                self.get(&TerminalKey::Real {
                    component: component.id,
                    index,
                })
            })
            .collect()
    }
}
