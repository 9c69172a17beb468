//! The relation (wire) table.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;
use crate::id::{NodeRef, RelId, SocketId};
use crate::state::State;

/// One endpoint of a relation: a node plus the socket on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    pub node: NodeRef,
    pub socket: SocketId,
}

impl Endpoint {
    pub fn new(node: NodeRef, socket: SocketId) -> Self {
        Endpoint { node, socket }
    }
}

/// A directed signal edge from a producer socket to a consumer socket,
/// carrying the last value sent through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    pub id: RelId,
    pub from: Endpoint,
    pub to: Endpoint,
    pub value: State,
}

/// Id-keyed relation storage with a monotonic id counter.
///
/// Ids are never reused within a scene; `0` is never issued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationTable {
    rels: IndexMap<RelId, Relation>,
    last: u32,
}

impl RelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(rels: Vec<Relation>, last: u32) -> Self {
        RelationTable {
            rels: rels.into_iter().map(|r| (r.id, r)).collect(),
            last,
        }
    }

    /// Issues the next relation id. The counter is untouched on failure.
    pub(crate) fn next_id(&mut self) -> Result<RelId, CoreError> {
        self.last = self.last.checked_add(1).ok_or(CoreError::RelIdsExhausted)?;
        Ok(RelId(self.last))
    }

    /// Highest id issued so far.
    pub fn last_id(&self) -> u32 {
        self.last
    }

    pub(crate) fn insert(&mut self, rel: Relation) {
        self.rels.insert(rel.id, rel);
    }

    pub(crate) fn remove(&mut self, id: RelId) -> Option<Relation> {
        self.rels.swap_remove(&id)
    }

    pub fn get(&self, id: RelId) -> Option<&Relation> {
        self.rels.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: RelId) -> Option<&mut Relation> {
        self.rels.get_mut(&id)
    }

    /// Looks up `id`, distinguishing ids never issued from removed ones.
    pub fn lookup(&self, id: RelId) -> Result<&Relation, CoreError> {
        if id.is_none() || id.0 > self.last {
            return Err(CoreError::InvalidRelId { id });
        }
        self.rels.get(&id).ok_or(CoreError::RelNotFound { id })
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Relations in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.rels.values()
    }

    /// Relations ordered by id.
    pub fn sorted(&self) -> Vec<&Relation> {
        let mut rels: Vec<&Relation> = self.rels.values().collect();
        rels.sort_by_key(|r| r.id);
        rels
    }
}
