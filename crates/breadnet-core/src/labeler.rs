//! Deterministic node numbering.
//!
//! Sets are numbered 0, 1, 2, ... in ascending order of the smallest
//! [`TerminalKey`] each one holds. Union-find roots and hash iteration order
//! never leak into the numbering.

use std::collections::HashMap;

use log::debug;

use crate::graph::Connectivity;
use crate::terminal::{TerminalId, Terminals};

/// Position of a node in labeler order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    /// node -> member terminals, sorted by key
    members: Vec<Vec<TerminalId>>,
    /// terminal -> node
    node_of: Vec<NodeIndex>,
}

impl NodeTable {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn node_of(&self, id: TerminalId) -> NodeIndex {
        self.node_of[id.index()]
    }

    pub fn members(&self, node: NodeIndex) -> &[TerminalId] {
        &self.members[node.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &[TerminalId])> {
        self.members
            .iter()
            .enumerate()
            .map(|(i, members)| (NodeIndex(i as u32), members.as_slice()))
    }
}

pub fn label_nodes(terminals: &Terminals, connectivity: &mut Connectivity) -> NodeTable {
    let mut by_root: HashMap<usize, Vec<TerminalId>> = HashMap::new();
    for id in terminals.ids() {
        by_root.entry(connectivity.root(id)).or_default().push(id);
    }

    let mut members: Vec<Vec<TerminalId>> = by_root
        .into_values()
        .map(|mut set| {
            set.sort_by_key(|&id| terminals.key(id));
            set
        })
        .collect();
    // Every set is non-empty and sorted, so its first entry is its minimum key.
    members.sort_by_key(|set| terminals.key(set[0]));

    let mut node_of = vec![NodeIndex(0); terminals.len()];
    for (i, set) in members.iter().enumerate() {
        for &id in set {
            node_of[id.index()] = NodeIndex(i as u32);
        }
    }

    debug!(
        "labeled {} nodes over {} terminals",
        members.len(),
        terminals.len()
    );
    NodeTable { members, node_of }
}
