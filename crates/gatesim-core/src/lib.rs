pub mod arena;
pub mod codec;
pub mod context;
pub mod error;
pub mod gate;
pub mod id;
pub mod meta;
pub mod node;
mod propagate;
pub mod relation;
pub mod scene;
pub mod state;
mod topology;

// Re-export commonly used types
pub use context::{ComponentContext, ContextMut, MAX_BOUNDARY_SOCKETS};
pub use error::CoreError;
pub use gate::{evaluate, GateType, MAX_GATE_INPUTS, MIN_GATE_INPUTS};
pub use id::{NodeKind, NodeRef, RelId, SocketId};
pub use meta::{parse_dependency, SceneMeta};
pub use node::{Component, Gate, Input, InputMode, Output, Point, SceneNode};
pub use relation::{Endpoint, Relation};
pub use scene::Scene;
pub use state::State;
