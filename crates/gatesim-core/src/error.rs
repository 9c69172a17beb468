//! Core error types for gatesim-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering every
//! recoverable failure of the circuit graph: stale references, connection
//! policy violations, malformed caller input and corrupt documents.
//!
//! A recoverable error always leaves the scene exactly as it was before the
//! failing call.

use thiserror::Error;

use crate::id::{NodeKind, NodeRef, RelId};

/// Core errors produced by the gatesim-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A reference names a node kind that cannot be used for the operation.
    #[error("invalid node: {node}")]
    InvalidNode { node: NodeRef },

    /// The referenced node is tombstoned or out of range.
    #[error("node not found: {node}")]
    NodeNotFound { node: NodeRef },

    /// The relation was issued once but has since been removed.
    #[error("relation not found: {id}")]
    RelNotFound { id: RelId },

    /// The relation id is 0 or was never issued by this scene.
    #[error("invalid relation id: {id}")]
    InvalidRelId { id: RelId },

    /// Outputs and component output sockets can not drive a relation.
    #[error("{kind} can not be used as a from type")]
    InvalidFromType { kind: NodeKind },

    /// Inputs and component input sockets can not consume a relation.
    #[error("{kind} can not be used as a to type")]
    InvalidToType { kind: NodeKind },

    /// Boundary sockets were used on a scene without a component context.
    #[error("scene is not a component")]
    NotAComponent,

    /// The consumer socket already has a relation bound to it.
    #[error("socket {socket} of {node} is already connected")]
    AlreadyConnected { node: NodeRef, socket: u32 },

    /// The consumer socket named by a relation does not hold that relation.
    #[error("socket {socket} of {node} is not connected")]
    NotConnected { node: NodeRef, socket: u32 },

    /// Every relation id has been issued.
    #[error("relation ids exhausted")]
    RelIdsExhausted,

    /// A caller-supplied value does not satisfy the operation's bounds.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A required argument was not supplied.
    #[error("operation requires an argument")]
    NoArgument,

    /// A metadata string is too long for its field.
    #[error("invalid string for {field}: {len} bytes, at most {max} allowed")]
    InvalidString {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Decoding met a truncated buffer or a byte it can not interpret.
    #[error("unexpected byte at offset {offset}: {reason}")]
    InvalidByte { offset: usize, reason: String },

    /// The decoded graph violates a structural invariant.
    #[error("invalid scene document: {reason}")]
    InvalidSceneFormat { reason: String },

    /// The embedded metadata block is not valid JSON.
    #[error("invalid JSON in scene metadata: {reason}")]
    InvalidJson { reason: String },

    /// A component node names a dependency that does not exist.
    #[error("component not found: dependency {index}")]
    ComponentNotFound { index: usize },

    /// A dependency string is not of the form `author/name/version`.
    #[error("invalid dependency string: '{value}'")]
    InvalidDependencyFormat { value: String },
}

impl CoreError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        CoreError::InvalidSceneFormat {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_element() {
        let err = CoreError::NodeNotFound {
            node: NodeRef::new(NodeKind::Gate, 3),
        };
        assert_eq!(err.to_string(), "node not found: Gate@3");

        let err = CoreError::InvalidFromType {
            kind: NodeKind::Output,
        };
        assert_eq!(err.to_string(), "Output can not be used as a from type");
    }

    #[test]
    fn invalid_string_reports_bounds() {
        let err = CoreError::InvalidString {
            field: "name",
            len: 200,
            max: 127,
        };
        assert_eq!(
            err.to_string(),
            "invalid string for name: 200 bytes, at most 127 allowed"
        );
    }
}
