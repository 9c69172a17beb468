//! Stable identifiers for graph entities.
//!
//! Nodes are addressed by a [`NodeRef`]: a kind tag plus an index into the
//! owning scene's arena for that kind. Relations are addressed by a
//! [`RelId`]; the value `0` is reserved and means "unconnected" wherever a
//! socket stores one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Index of a numbered input or output slot on a node.
pub type SocketId = u32;

/// The kind of node a [`NodeRef`] points at.
///
/// The two boundary kinds are virtual: they address the sockets of the
/// scene's component context and never live in an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Gate,
    Input,
    Output,
    Component,
    /// A virtual input of the scene's component context.
    ComponentInputBoundary,
    /// A virtual output of the scene's component context.
    ComponentOutputBoundary,
}

impl NodeKind {
    /// Kinds that live in an arena, in serialization order.
    pub const STORED: [NodeKind; 4] = [
        NodeKind::Gate,
        NodeKind::Input,
        NodeKind::Output,
        NodeKind::Component,
    ];

    /// Returns `true` for the two virtual boundary kinds.
    pub fn is_boundary(self) -> bool {
        matches!(
            self,
            NodeKind::ComponentInputBoundary | NodeKind::ComponentOutputBoundary
        )
    }

    /// Returns `true` if nodes of this kind can drive a relation.
    pub fn is_producer(self) -> bool {
        !matches!(self, NodeKind::Output | NodeKind::ComponentOutputBoundary)
    }

    /// Returns `true` if nodes of this kind can consume a relation.
    pub fn is_consumer(self) -> bool {
        !matches!(self, NodeKind::Input | NodeKind::ComponentInputBoundary)
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            NodeKind::Gate => 0,
            NodeKind::Input => 1,
            NodeKind::Output => 2,
            NodeKind::Component => 3,
            NodeKind::ComponentInputBoundary => 4,
            NodeKind::ComponentOutputBoundary => 5,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => NodeKind::Gate,
            1 => NodeKind::Input,
            2 => NodeKind::Output,
            3 => NodeKind::Component,
            4 => NodeKind::ComponentInputBoundary,
            5 => NodeKind::ComponentOutputBoundary,
            _ => return None,
        })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Gate => "Gate",
            NodeKind::Input => "Input",
            NodeKind::Output => "Output",
            NodeKind::Component => "Component",
            NodeKind::ComponentInputBoundary => "CIn",
            NodeKind::ComponentOutputBoundary => "COut",
        };
        f.write_str(name)
    }
}

impl FromStr for NodeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Gate" => Ok(NodeKind::Gate),
            "Input" => Ok(NodeKind::Input),
            "Output" => Ok(NodeKind::Output),
            "Component" => Ok(NodeKind::Component),
            "CIn" => Ok(NodeKind::ComponentInputBoundary),
            "COut" => Ok(NodeKind::ComponentOutputBoundary),
            other => Err(CoreError::invalid_argument(format!(
                "unknown node kind '{other}'"
            ))),
        }
    }
}

/// A kind-tagged arena index identifying one node of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub index: u32,
}

impl NodeRef {
    pub fn new(kind: NodeKind, index: u32) -> Self {
        NodeRef { kind, index }
    }

    /// Reference to the `index`-th virtual input of a component context.
    pub fn boundary_input(index: u32) -> Self {
        NodeRef::new(NodeKind::ComponentInputBoundary, index)
    }

    /// Reference to the `index`-th virtual output of a component context.
    pub fn boundary_output(index: u32) -> Self {
        NodeRef::new(NodeKind::ComponentOutputBoundary, index)
    }

    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.index)
    }
}

/// Parses the `Kind@index` form produced by `Display`.
impl FromStr for NodeRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = s.split_once('@').ok_or_else(|| {
            CoreError::invalid_argument(format!("expected Kind@index, found '{s}'"))
        })?;
        let index = index.parse::<u32>().map_err(|_| {
            CoreError::invalid_argument(format!("invalid node index '{index}'"))
        })?;
        Ok(NodeRef::new(kind.parse()?, index))
    }
}

/// Identifier of a relation. `RelId(0)` is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct RelId(pub u32);

impl RelId {
    /// The "unconnected" marker stored in empty sockets.
    pub const NONE: RelId = RelId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
